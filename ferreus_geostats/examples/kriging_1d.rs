use ferreus_geostats::{
    CartesianGrid, EstimationProblem, IdwEstimator, IdwParams, KrigingEstimator, KrigingParams,
    PointSet, SampleTable, SpatialData,
};
use ferreus_geostats_utils::models::GaussianVariogram;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Three samples along a 100 cell line
    let table = SampleTable::new().with_values("z", &[1.0, 0.0, 1.0])?;
    let data = SpatialData::new(PointSet::from_coords(&[[25.0], [50.0], [75.0]]), table)?;
    let grid = CartesianGrid::unit(&[100])?;

    let problem = EstimationProblem::new(&data, &grid)?;

    // Ordinary Kriging with every sample in a single system
    let variogram = GaussianVariogram {
        sill: 1.0,
        range: 35.0,
        nugget: 0.0,
    };
    let kriging = KrigingEstimator::new()
        .variable("z", KrigingParams::builder(variogram).build())
        .solve(&problem)?;

    // Inverse distance weighting over all samples for comparison
    let idw = IdwEstimator::new()
        .variable("z", IdwParams::default())
        .solve(&problem)?;

    let (Some(kriged), Some(weighted)) = (kriging.get("z"), idw.get("z")) else {
        return Ok(());
    };
    for i in (0..grid.dims()[0]).step_by(10) {
        println!(
            "x = {:>3}  kriging = {:>7.4} (variance {:>6.4})  idw = {:>7.4}",
            i,
            kriged.mean[i].unwrap_or(f64::NAN),
            kriged.variance[i].unwrap_or(f64::NAN),
            weighted.mean[i].unwrap_or(f64::NAN),
        );
    }

    Ok(())
}
