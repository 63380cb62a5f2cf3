//! `circ validate`: check a scenario without running it.

use anyhow::Result;

pub fn validate(config_paths: &[String], fail_on_unused_keys: bool) -> Result<()> {
    let (loaded, scenario, unused) = super::load_scenario(config_paths, fail_on_unused_keys)?;
    // Building the world catches anything the model itself rejects.
    let world = scenario.build_world()?;

    let (commodities, industries, classes) = scenario.entity_counts();
    println!("config_hash={}", loaded.config_hash);
    println!("project_id={}", scenario.project.id);
    println!("project_name={}", scenario.project.name);
    println!("commodities={commodities}");
    println!("industries={industries}");
    println!("classes={classes}");
    println!("stocks={}", world.stocks().count());
    println!("unused_keys={unused}");
    println!("valid=true");
    Ok(())
}
