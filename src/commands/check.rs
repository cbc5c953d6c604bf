use crate::{CheckArgs, build::Builder};

pub fn run(args: &CheckArgs) -> Result<(), anyhow::Error> {
    let (config, base_path, _) = super::load_config(args.config_file.as_deref())?;

    let report = Builder::new(&config, &base_path).check()?;

    if report.is_clean() {
        println!("Checked {} document(s), no problems found", report.documents);
        return Ok(());
    }

    for finding in &report.findings {
        println!("{}: {}", finding.document, finding.message);
    }

    Err(anyhow::anyhow!(
        "found {} problem(s) in {} document(s)",
        report.findings.len(),
        report.documents
    ))
}
