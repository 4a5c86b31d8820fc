use crate::{
    animation::spline::{Knot, Spline},
    foundation::error::FlockResult,
    foundation::math::Rng64,
};

const TURN: f64 = 360.0;
/// Largest difference a clockwise blend leaves untouched.
const SHORT_LIMIT: f64 = 179.0;

/// How the two boundary values of an angular field are reconciled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AngleMode {
    /// Not an angle; values are used as-is.
    Plain,
    /// Take the shorter rotation, shifting the right end by at most one turn.
    Clockwise,
    /// Normalize both ends to `[0, 360)` and traverse exactly this many clockwise turns.
    Loops(u32),
}

/// Derivative scale factors mapping each side's normalized time onto the blended duration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SlopeScale {
    pub(crate) left: f64,
    pub(crate) right: f64,
}

/// Build the transition spline from the end of `a` to the start of `b`.
///
/// The result starts at `a(1)` with slope `a'(1) * scale.left` and ends at `b(0)` (adjusted by
/// whole turns per `mode`) with slope `b'(0) * scale.right`. With `stagger`, two interior knots
/// at `t = 0.05` and `t = 0.95` are pushed a random fraction of the gap along the transition.
pub(crate) fn blend_knots(
    a: &Spline,
    b: &Spline,
    scale: SlopeScale,
    mode: AngleMode,
    stagger: Option<&mut Rng64>,
) -> FlockResult<Spline> {
    let (mut start, start_slope) = (a.eval(1.0), a.deriv(1.0) * scale.left);
    let (mut end, end_slope) = (b.eval(0.0), b.deriv(0.0) * scale.right);

    match mode {
        AngleMode::Plain => {}
        AngleMode::Clockwise => end = shortest_turn(start, end),
        AngleMode::Loops(loops) => {
            start = start.rem_euclid(TURN);
            end = end.rem_euclid(TURN);
            if loops > 0 {
                end = with_turns(start, end, loops);
            }
        }
    }

    let Some(rng) = stagger else {
        return Ok(Spline::hermite(start, start_slope, end, end_slope));
    };
    let gap = end - start;
    let near = start + 0.05 * (start_slope + rng.next_f64_01() * gap);
    let far = end - 0.05 * (end_slope + rng.next_f64_01() * gap);
    Spline::new(
        vec![
            Knot::new(0.0, start),
            Knot::new(0.05, near),
            Knot::new(0.95, far),
            Knot::new(1.0, end),
        ],
        Some(start_slope),
        Some(end_slope),
    )
}

/// Take the shorter rotation: one turn off `end` when `end - start > 179`, one turn on when it is
/// below `-179`.
pub(crate) fn shortest_turn(start: f64, end: f64) -> f64 {
    let d = end - start;
    if d > SHORT_LIMIT {
        end - TURN
    } else if d < -SHORT_LIMIT {
        end + TURN
    } else {
        end
    }
}

/// Shift `end` by whole turns so `start - end` lies in `[(loops - 0.5) * 360, (loops + 0.5) * 360)`.
pub(crate) fn with_turns(start: f64, end: f64, loops: u32) -> f64 {
    let loops = f64::from(loops);
    let mut end = end - TURN * loops;
    while start - end >= (loops + 0.5) * TURN {
        end += TURN;
    }
    while start - end < (loops - 0.5) * TURN {
        end -= TURN;
    }
    end
}

#[cfg(test)]
#[path = "../../tests/unit/blend/interp.rs"]
mod tests;
