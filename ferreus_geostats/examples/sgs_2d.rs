use ferreus_geostats::{
    generate_random_points, progress::closure_sink, progress::ProgressMsg, CartesianGrid,
    KrigingParams, Path, PointSet, SampleTable, SequentialGaussianSimulator, SimulationProblem,
    SpatialData,
};
use ferreus_geostats_utils::models::SphericalVariogram;
use rand::{rngs::StdRng, SeedableRng};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Scatter 50 samples over a 64 x 64 grid and give them a smooth trend
    let mut points = generate_random_points(50, 2, Some(7));
    let mut values = Vec::with_capacity(points.nrows());
    for i in 0..points.nrows() {
        points[(i, 0)] *= 63.0;
        points[(i, 1)] *= 63.0;
        values.push((points[(i, 0)] / 20.0).sin() + (points[(i, 1)] / 30.0).cos());
    }

    let table = SampleTable::new().with_values("grade", &values)?;
    let data = SpatialData::new(PointSet::new(points), table)?;
    let grid = CartesianGrid::unit(&[64, 64])?;

    let (sink, listener) = closure_sink(64, |msg| {
        if let ProgressMsg::RealizationFinished {
            realization,
            fallbacks,
            ..
        } = msg
        {
            println!("realization {realization} done, {fallbacks} marginal draws");
        }
    });

    let variogram = SphericalVariogram {
        sill: 1.0,
        range: 25.0,
        nugget: 0.05,
    };
    let sgs = SequentialGaussianSimulator::new()
        .variable(
            "grade",
            KrigingParams::builder(variogram).max_neighbors(16).build(),
        )
        .path(Path::Random)
        .progress_sink(sink);

    let problem = SimulationProblem::new(&data, &grid)?;
    let solution = sgs.solve(&problem, 4, &mut StdRng::seed_from_u64(2026))?;

    // Dropping the simulator releases the last sink so the listener can exit
    drop(sgs);
    let _ = listener.join();

    if let Some(realizations) = solution.get("grade") {
        for (r, realization) in realizations.iter().enumerate() {
            let mean = realization.iter().sum::<f64>() / realization.len() as f64;
            println!("realization {r}: mean {mean:.4}");
        }
    }

    Ok(())
}
