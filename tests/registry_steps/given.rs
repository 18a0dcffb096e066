//! Given steps for registry BDD scenarios.

use super::world::{RegistryWorld, run_async};
use eyre::WrapErr;
use mlregistry::registry::services::{
    CreateAlgorithmRequest, CreateEndpointRequest, LogInferenceRequest, RecordStatusRequest,
};
use rstest_bdd_macros::given;

#[given(r#"an endpoint "{name}" owned by "{owner}""#)]
fn an_endpoint(
    world: &mut RegistryWorld,
    name: String,
    owner: String,
) -> Result<(), eyre::Report> {
    let endpoint = run_async(
        world
            .service
            .create_endpoint(CreateEndpointRequest::new(name, owner)),
    )
    .wrap_err("create endpoint for scenario")?;
    world.endpoint = Some(endpoint);
    Ok(())
}

#[given(r#"an algorithm "{name}" version "{version}" under that endpoint"#)]
fn an_algorithm(
    world: &mut RegistryWorld,
    name: String,
    version: String,
) -> Result<(), eyre::Report> {
    let endpoint = world.endpoint_id()?;
    let request = CreateAlgorithmRequest::new(endpoint, name, version, "admin")
        .with_description("Random forest with simple pre- and post-processing");
    let algorithm = run_async(world.service.create_algorithm(request))
        .wrap_err("create algorithm for scenario")?;
    world.algorithm = Some(algorithm);
    Ok(())
}

#[given(r#"the algorithm has an active status "{status}""#)]
fn an_active_status(world: &mut RegistryWorld, status: String) -> Result<(), eyre::Report> {
    let algorithm = world.algorithm_id()?;
    run_async(
        world
            .service
            .record_status(RecordStatusRequest::new(algorithm, status, true, "admin")),
    )
    .wrap_err("record status for scenario")?;
    Ok(())
}

#[given("the algorithm has logged {count:usize} requests")]
fn logged_requests(world: &mut RegistryWorld, count: usize) -> Result<(), eyre::Report> {
    let algorithm = world.algorithm_id()?;
    for index in 0..count {
        let request = LogInferenceRequest::new(
            algorithm,
            format!(r#"{{"age": {}}}"#, 30 + index),
            r#"{"label": "<=50K", "probability": 0.04}"#,
            r#"{"label": "<=50K"}"#,
        );
        let logged = run_async(world.service.log_request(request))
            .wrap_err("log request for scenario")?;
        world.requests.push(logged);
    }
    Ok(())
}

#[given("no endpoints exist")]
fn no_endpoints(world: &mut RegistryWorld) -> Result<(), eyre::Report> {
    let endpoints =
        run_async(world.service.list_endpoints()).wrap_err("list endpoints for scenario")?;
    if !endpoints.is_empty() {
        return Err(eyre::eyre!("expected an empty registry, found {}", endpoints.len()));
    }
    Ok(())
}
