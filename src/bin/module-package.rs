use std::path::Path;

use anyhow::{bail, Context, Result};
use module_packager::archive::compressor_for;
use module_packager::pipeline::{package, ModuleProject};
use module_packager::preflight::check_required_tools;
use module_packager::{init_tracing, BuildStamp, BuildType};

fn usage() -> &'static str {
    "Usage:\n  module-package [debug|release]\n\n\
     Packages the module in the current directory into <buildType>/<name>-<version>-<versionCode>-<buildType>.zip.\n\
     Anything other than 'release' builds a debug archive."
}

fn main() -> Result<()> {
    init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();

    let build_type = match args.as_slice() {
        [flag] if flag == "-h" || flag == "--help" => {
            println!("{}", usage());
            return Ok(());
        }
        [] => BuildType::from_arg(None),
        [kind] => BuildType::from_arg(Some(kind)),
        _ => bail!(usage()),
    };

    let cwd = std::env::current_dir().context("resolving current directory")?;
    run(&cwd, build_type)
}

fn run(module_dir: &Path, build_type: BuildType) -> Result<()> {
    println!("[package:{build_type}] starting {} build", build_type.label());

    let project = ModuleProject::open(module_dir)
        .with_context(|| format!("loading module project '{}'", module_dir.display()))?;
    let compressor = compressor_for(project.config.archiver);
    check_required_tools(compressor.required_tools()).context("checking host tools")?;

    let outcome = package(&project, build_type, compressor.as_ref(), &BuildStamp::now())
        .with_context(|| format!("packaging {} build", build_type))?;

    println!(
        "[package:{build_type}] {} build complete; archive saved in {}",
        build_type.label(),
        outcome
            .archive
            .parent()
            .unwrap_or(module_dir)
            .display()
    );
    if build_type == BuildType::Release {
        println!("[package:{build_type}] run module-publish to create a GitHub release");
    }
    Ok(())
}
