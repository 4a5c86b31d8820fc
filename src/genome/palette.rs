use std::fmt::Write as _;

use crate::foundation::error::{FlockError, FlockResult};

/// One palette entry, channels normalized to `[0, 1]`.
pub type Rgb = [f64; 3];

const RGB8_PREFIX: &str = "rgb8:";

/// An ordered colour table indexed by the normalized colour coordinate.
///
/// Entries are held as normalized floats. The encoded form is the string `rgb8:` followed by two
/// hex digits per channel, quantizing to 8 bits.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    entries: Vec<Rgb>,
}

impl Palette {
    /// Build a palette from normalized entries.
    pub fn new(entries: Vec<Rgb>) -> FlockResult<Self> {
        if entries.is_empty() {
            return Err(FlockError::validation("palette must have at least one entry"));
        }
        if entries.iter().flatten().any(|c| !c.is_finite()) {
            return Err(FlockError::validation("palette entries must be finite"));
        }
        Ok(Self { entries })
    }

    /// Build a palette from 8-bit entries.
    pub fn from_rgb8(entries: &[[u8; 3]]) -> FlockResult<Self> {
        Self::new(
            entries
                .iter()
                .map(|px| px.map(|c| f64::from(c) / 255.0))
                .collect(),
        )
    }

    /// Entries in index order.
    pub fn entries(&self) -> &[Rgb] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; palettes are non-empty by construction.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The same table with its index axis reversed.
    pub fn reversed(&self) -> Self {
        let mut entries = self.entries.clone();
        entries.reverse();
        Self { entries }
    }

    /// Entries quantized to 8 bits.
    pub fn to_rgb8(&self) -> Vec<[u8; 3]> {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        self.entries.iter().map(|px| px.map(to_u8)).collect()
    }

    fn encode(&self) -> String {
        let mut s = String::with_capacity(RGB8_PREFIX.len() + self.entries.len() * 6);
        s.push_str(RGB8_PREFIX);
        for px in self.to_rgb8() {
            for c in px {
                let _ = write!(s, "{c:02x}");
            }
        }
        s
    }

    fn decode(s: &str) -> Result<Self, String> {
        let hex = s
            .trim()
            .strip_prefix(RGB8_PREFIX)
            .ok_or_else(|| format!("palette must start with \"{RGB8_PREFIX}\""))?;
        if hex.is_empty() || hex.len() % 6 != 0 || !hex.is_ascii() {
            return Err("palette body must be a non-empty run of RRGGBB hex triplets".to_owned());
        }

        fn hex_byte(pair: &str) -> Result<u8, String> {
            u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
        }

        let mut entries = Vec::with_capacity(hex.len() / 6);
        for i in (0..hex.len()).step_by(6) {
            entries.push([
                hex_byte(&hex[i..i + 2])?,
                hex_byte(&hex[i + 2..i + 4])?,
                hex_byte(&hex[i + 4..i + 6])?,
            ]);
        }
        Self::from_rgb8(&entries).map_err(|e| e.to_string())
    }
}

impl serde::Serialize for Palette {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> serde::Deserialize<'de> for Palette {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::decode(&s).map_err(serde::de::Error::custom)
    }
}

/// Which palette is in effect over normalized time.
#[derive(Clone, Debug, PartialEq)]
pub enum PaletteTimes {
    /// One palette for the whole genome, written as a string index (`"0"`).
    Single(usize),
    /// `(time, palette index)` pairs sorted by time, written flat as `[t0, "i0", t1, "i1", ...]`.
    Knots(Vec<(f64, usize)>),
}

impl Default for PaletteTimes {
    fn default() -> Self {
        Self::Single(0)
    }
}

impl PaletteTimes {
    /// Palette 0 at `t = 0`, palette 1 at `t = 1`.
    pub fn endpoints() -> Self {
        Self::Knots(vec![(0.0, 0), (1.0, 1)])
    }

    /// Endpoint palettes 0 and 1 with their smoothed copies 2 and 3 placed just inside the range.
    pub fn smoothed_endpoints() -> Self {
        Self::Knots(vec![(0.0, 0), (0.1, 2), (0.9, 3), (1.0, 1)])
    }

    /// Palette in effect at `t = 0`.
    pub fn start_index(&self) -> usize {
        match self {
            Self::Single(i) => *i,
            Self::Knots(k) => k.first().map_or(0, |(_, i)| *i),
        }
    }

    /// Palette in effect at `t = 1`.
    pub fn end_index(&self) -> usize {
        match self {
            Self::Single(i) => *i,
            Self::Knots(k) => k.last().map_or(0, |(_, i)| *i),
        }
    }

    /// Check ordering and that every index refers to one of `palette_count` palettes.
    pub fn validate(&self, palette_count: usize) -> FlockResult<()> {
        let check = |i: usize| {
            if i < palette_count {
                Ok(())
            } else {
                Err(FlockError::validation(format!(
                    "palette_times refers to palette {i} but only {palette_count} exist"
                )))
            }
        };
        match self {
            Self::Single(i) => check(*i),
            Self::Knots(k) => {
                if k.is_empty() {
                    return Err(FlockError::validation("palette_times must not be empty"));
                }
                if !k.windows(2).all(|w| w[0].0 <= w[1].0) {
                    return Err(FlockError::validation(
                        "palette_times must be sorted by time",
                    ));
                }
                k.iter().try_for_each(|(_, i)| check(*i))
            }
        }
    }
}

impl serde::Serialize for PaletteTimes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;

        match self {
            Self::Single(i) => serializer.collect_str(i),
            Self::Knots(k) => {
                let mut seq = serializer.serialize_seq(Some(k.len() * 2))?;
                for (t, i) in k {
                    seq.serialize_element(t)?;
                    seq.serialize_element(&i.to_string())?;
                }
                seq.end()
            }
        }
    }
}

impl<'de> serde::Deserialize<'de> for PaletteTimes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Elem {
            Time(f64),
            Index(String),
        }

        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Single(String),
            Flat(Vec<Elem>),
        }

        fn index<E: serde::de::Error>(s: &str) -> Result<usize, E> {
            s.trim()
                .parse::<usize>()
                .map_err(|_| E::custom(format!("invalid palette index \"{s}\"")))
        }

        match Repr::deserialize(deserializer)? {
            Repr::Single(s) => index(&s).map(Self::Single),
            Repr::Flat(elems) => {
                if elems.len() % 2 != 0 {
                    return Err(serde::de::Error::custom(
                        "palette_times must alternate time and index",
                    ));
                }
                elems
                    .chunks_exact(2)
                    .map(|pair| match pair {
                        [Elem::Time(t), Elem::Index(i)] => Ok((*t, index::<D::Error>(i)?)),
                        _ => Err(<D::Error as serde::de::Error>::custom(
                            "palette_times must alternate time and index",
                        )),
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(Self::Knots)
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/genome/palette.rs"]
mod tests;
