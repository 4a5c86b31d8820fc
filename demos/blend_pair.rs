use flock::{BlendOpts, Genome, blend_genomes};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let left: Genome = serde_json::from_str(include_str!("../tests/data/spiral.json"))?;
    let right: Genome = serde_json::from_str(include_str!("../tests/data/dusk.json"))?;

    // Options may come as JSON; missing fields take their defaults.
    let opts: BlendOpts = match std::env::args().nth(1) {
        Some(json) => serde_json::from_str(&json)?,
        None => BlendOpts::default(),
    };

    let out = blend_genomes(&left, &right, &opts)?;
    for (key, x) in &out.xforms {
        let angle = &x.affine.angle;
        println!(
            "xform {key}: angle {:.1} -> {:.1}, colour {:.3} -> {:.3}",
            angle.eval(0.0),
            angle.eval(1.0),
            x.color.eval(0.0),
            x.color.eval(1.0),
        );
    }
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
