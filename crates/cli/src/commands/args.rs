use std::path::PathBuf;

use clap::{Args, Parser};
use framework_core::backends::SigningRequest;

/// Prepare an imported dynamic framework for embedding.
///
/// Copies the framework containing `--framework_binary` into `--temp_path`,
/// thins its binaries to the architectures named by `--slice`, optionally strips
/// bitcode, signs the copy, and writes a reproducible zip to `--output_zip`.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "framework-processor",
    version,
    about = "Slice, strip, sign and zip an imported dynamic framework",
    long_about = None
)]
pub struct ProcessArgs {
    /// Path to a binary file scoped to the imported framework (repeatable).
    #[arg(long = "framework_binary", required = true)]
    pub framework_binary: Vec<PathBuf>,

    /// Target architecture, optionally `sim_`-prefixed (repeatable).
    #[arg(long = "slice", required = true)]
    pub slice: Vec<String>,

    /// Strip bitcode from the framework binaries.
    #[arg(long = "strip_bitcode", default_value_t = false)]
    pub strip_bitcode: bool,

    /// Non-binary file scoped to the imported framework (repeatable).
    #[arg(long = "framework_file")]
    pub framework_file: Vec<PathBuf>,

    /// Staging directory for the framework copy. Destroyed if it already exists.
    #[arg(long = "temp_path")]
    pub temp_path: PathBuf,

    /// Destination of the signed, sliced framework zip. Replaced if it exists.
    #[arg(long = "output_zip")]
    pub output_zip: PathBuf,

    /// Keep the staging directory after a successful run.
    #[arg(long = "keep_temp_path", default_value_t = false)]
    pub keep_temp_path: bool,

    /// JSON file naming external tool locations (see `ToolConfig`).
    #[arg(long = "tool_config")]
    pub tool_config: Option<PathBuf>,

    #[command(flatten)]
    pub signing: SigningArgs,
}

/// Flags consumed by the signing step.
#[derive(Args, Debug, Clone)]
pub struct SigningArgs {
    /// Path to the codesign executable.
    #[arg(long = "codesign", default_value = "/usr/bin/codesign")]
    pub codesign: PathBuf,

    /// Signing identity; `-` signs ad hoc.
    #[arg(long = "identity", default_value = "-")]
    pub identity: String,

    /// Entitlements plist to embed.
    #[arg(long = "entitlements")]
    pub entitlements: Option<PathBuf>,

    /// Replace any existing signature.
    #[arg(long = "force", default_value_t = false)]
    pub force: bool,

    /// Do not contact the timestamp server.
    #[arg(long = "disable_timestamp", default_value_t = false)]
    pub disable_timestamp: bool,

    /// Skip signing entirely.
    #[arg(long = "disable_signing", default_value_t = false)]
    pub disable_signing: bool,

    /// File to sign (repeatable). Defaults to the staging directory.
    #[arg(long = "target_to_sign")]
    pub target_to_sign: Vec<PathBuf>,

    /// Directory to sign (repeatable).
    #[arg(long = "directory_to_sign")]
    pub directory_to_sign: Vec<PathBuf>,

    /// Path that is already signed and must be skipped (repeatable).
    #[arg(long = "signed_path")]
    pub signed_path: Vec<PathBuf>,
}

impl From<&SigningArgs> for SigningRequest {
    fn from(args: &SigningArgs) -> Self {
        SigningRequest {
            codesign: args.codesign.clone(),
            identity: args.identity.clone(),
            entitlements: args.entitlements.clone(),
            force: args.force,
            disable_timestamp: args.disable_timestamp,
            disable_signing: args.disable_signing,
            targets_to_sign: args.target_to_sign.clone(),
            directories_to_sign: args.directory_to_sign.clone(),
            signed_paths: args.signed_path.clone(),
        }
    }
}
