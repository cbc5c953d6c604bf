use crate::{BuildArgs, build::Builder};

pub fn run(args: &BuildArgs) -> Result<(), anyhow::Error> {
    let (config, base_path, _) = super::load_config(args.config_file.as_deref())?;

    let result = Builder::new(&config, &base_path).build()?;
    log::debug!("build phases: {:?}", result.phases);

    let display_output = result
        .output_dir
        .canonicalize()
        .unwrap_or(result.output_dir.clone());
    println!(
        "Built site to {} ({} documents, {} static files)",
        display_output.display(),
        result.documents,
        result.static_files
    );

    Ok(())
}
