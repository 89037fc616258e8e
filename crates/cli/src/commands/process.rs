use anyhow::Result;
use framework_core::backends::{BinaryProcessor, Signer, SigningRequest};
use framework_core::config::ToolConfig;
use framework_core::services::backends::{CodesignSigner, XcrunProcessor};
use framework_core::services::pipeline::{FrameworkPipeline, ProcessRequest};

use crate::commands::ProcessArgs;
use crate::{absolutize, sha256_file};

/// Build the core request from parsed flags, making relative binary paths absolute.
pub fn build_process_request(args: &ProcessArgs) -> Result<ProcessRequest> {
    let framework_binaries =
        args.framework_binary.iter().map(|path| absolutize(path)).collect::<Result<Vec<_>>>()?;
    Ok(ProcessRequest {
        framework_binaries,
        slices: args.slice.clone(),
        strip_bitcode: args.strip_bitcode,
        framework_files: args.framework_file.clone(),
        temp_path: args.temp_path.clone(),
        output_zip: args.output_zip.clone(),
        keep_temp_path: args.keep_temp_path,
    })
}

/// Run the pipeline with the given collaborators and return the process exit status.
pub fn run_with(
    args: &ProcessArgs,
    processor: &dyn BinaryProcessor,
    signer: &dyn Signer,
) -> Result<i32> {
    let request = build_process_request(args)?;
    let signing = SigningRequest::from(&args.signing);
    let pipeline = FrameworkPipeline { processor, signer };

    match pipeline.run(&request, &signing) {
        Ok(outcome) => {
            let digest = sha256_file(&outcome.output_zip)?;
            log::info!("{} sha256={digest}", outcome.output_zip.display());
            Ok(0)
        }
        Err(err) => {
            eprintln!("Error: {err}");
            Ok(err.exit_code())
        }
    }
}

/// Process one imported framework using the real developer tools.
pub fn process_framework_command(args: &ProcessArgs) -> Result<i32> {
    let config = ToolConfig::resolve(args.tool_config.as_deref())?;
    let processor = XcrunProcessor::new(&config);
    run_with(args, &processor, &CodesignSigner)
}
