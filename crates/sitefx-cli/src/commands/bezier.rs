use anyhow::Result;

use sitefx_core::motion::CubicBezier;

pub fn run(points: [f64; 4], steps: usize) -> Result<()> {
    let curve = CubicBezier::try_from(points)?;
    let steps = steps.max(1);

    println!(
        "cubic-bezier({}, {}, {}, {})\n",
        points[0], points[1], points[2], points[3]
    );
    println!("  {:>6}  {:>8}", "t", "eased");

    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let eased = curve.solve(t);
        let bar = "#".repeat((eased.clamp(0.0, 1.5) * 40.0).round() as usize);
        println!("  {:>6.3}  {:>8.4}  {}", t, eased, bar);
    }

    Ok(())
}
