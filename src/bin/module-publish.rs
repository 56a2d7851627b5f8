use std::path::Path;

use anyhow::{bail, Context, Result};
use module_packager::archive::compressor_for;
use module_packager::pipeline::{publish, ModuleProject};
use module_packager::preflight::{check_required_tools, GH_TOOL};
use module_packager::process::SystemRunner;
use module_packager::publish::GhCli;
use module_packager::{init_tracing, BuildStamp};

fn usage() -> &'static str {
    "Usage:\n  module-publish\n\n\
     Packages the module in the current directory into releases/<id>-<version>.zip\n\
     and creates GitHub release v<version> with it attached (requires an authenticated `gh`)."
}

fn main() -> Result<()> {
    init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.as_slice() {
        [] => {}
        [flag] if flag == "-h" || flag == "--help" => {
            println!("{}", usage());
            return Ok(());
        }
        _ => bail!(usage()),
    }

    let cwd = std::env::current_dir().context("resolving current directory")?;
    run(&cwd)
}

fn run(module_dir: &Path) -> Result<()> {
    let project = ModuleProject::open(module_dir)
        .with_context(|| format!("loading module project '{}'", module_dir.display()))?;
    let compressor = compressor_for(project.config.archiver);

    let mut tools = compressor.required_tools().to_vec();
    tools.push(GH_TOOL);
    check_required_tools(&tools).context("checking host tools")?;

    let publisher = GhCli::new(SystemRunner, module_dir);
    let outcome = publish(&project, compressor.as_ref(), &publisher, &BuildStamp::now())
        .context("publishing module")?;

    println!(
        "[publish] done: {} {} ({})",
        outcome.metadata.name(),
        outcome.release.tag,
        outcome.archive.display()
    );
    Ok(())
}
