use crate::models::settings::Settings;
use crate::services::python::{self, PythonEnv};
use anyhow::{Context, Result, bail};
use std::env;
use std::io::{self, Write};
use std::process::Command;

const DIARIZATION_MODEL: &str = "pyannote/speaker-diarization-3.1";
const SEGMENTATION_MODEL: &str = "pyannote/segmentation-3.0";

/// Stores a Hugging Face token and switches speaker diarization on.
///
/// The token comes from `--token` or, interactively, from stdin. An already
/// configured token is kept unless `--force` is passed; `--verify` checks
/// whichever token is in effect, kept or new.
///
/// # Errors
/// Returns an error if the diarization stack is not importable, the token
/// is empty or implausibly short, the settings file cannot be written, or
/// `--verify` finds the token rejected.
pub fn run_setup(token: Option<&str>, force: bool, verify: bool) -> Result<()> {
    println!("🔑 Configuring speaker diarization for Whisper Fedora...");

    let env = PythonEnv::resolve(env::var_os("VIRTUAL_ENV"), None);
    let mut missing = false;
    for module in ["torch", "pyannote.audio"] {
        if env.module_available(module) {
            println!("✅ Python module {module} importable");
        } else {
            println!("❌ Python module {module} is NOT installed");
            missing = true;
        }
    }
    if missing {
        bail!("Install the missing dependencies first: pip install pyannote.audio torch");
    }

    let mut settings = Settings::load();
    if settings.has_hf_token() && !force {
        let masked = settings.masked_token().unwrap_or_default();
        if token.is_some() {
            bail!(
                "A Hugging Face token is already configured ({masked}). Pass --force to replace it."
            );
        }
        println!("✅ Token already configured: {masked}");
        println!("   Pass --force to replace it.");
        if verify {
            let stored = settings.hf_token.as_deref().unwrap_or_default();
            verify_token(&env, stored)?;
        }
        return Ok(());
    }

    let from_flag = token.is_some();
    let token = match token {
        Some(token) => token.trim().to_owned(),
        None => prompt_for_token()?,
    };
    if token.is_empty() {
        bail!("No token entered");
    }
    if token.len() < 10 {
        bail!("Token seems too short. Please check and try again.");
    }

    settings.hf_token = Some(token.clone());
    settings.diarization_enabled = true;
    let path = settings.save()?;
    println!("✅ Token saved to {}", path.display());
    println!("   Diarization is now enabled.");
    if from_flag {
        println!("ℹ️ The models stay gated until both licenses are accepted:");
        println!("   https://huggingface.co/{DIARIZATION_MODEL}");
        println!("   https://huggingface.co/{SEGMENTATION_MODEL}");
    }

    if verify {
        verify_token(&env, &token)?;
    }
    Ok(())
}

fn prompt_for_token() -> Result<String> {
    println!("Speaker diarization requires access to pyannote models on Hugging Face.");
    println!("  1. Create a free account at https://huggingface.co");
    println!("  2. Create a token with read access at https://huggingface.co/settings/tokens");
    println!("  3. Accept the model licenses at:");
    println!("     https://huggingface.co/{DIARIZATION_MODEL}");
    println!("     https://huggingface.co/{SEGMENTATION_MODEL}");
    print!("Enter your Hugging Face token: ");
    io::stdout().flush().context("Could not flush stdout")?;

    let mut token = String::new();
    io::stdin().read_line(&mut token).context("Could not read the token from stdin")?;
    Ok(token.trim().to_owned())
}

/// Tries to load the gated diarization pipeline with the new token.
///
/// The token travels to the interpreter through the environment, never on
/// the command line.
fn verify_token(env: &PythonEnv, token: &str) -> Result<()> {
    println!("🧪 Testing pyannote pipeline access, this needs the network...");
    let script = format!(
        "import os\nfrom pyannote.audio import Pipeline\nPipeline.from_pretrained('{DIARIZATION_MODEL}', use_auth_token=os.environ['WF_HF_TOKEN'])\n"
    );

    let mut cmd = Command::new(python::PYTHON);
    cmd.args(["-c", &script]).env("WF_HF_TOKEN", token);
    env.apply_to_command(&mut cmd)?;
    let output = cmd.output().context("Failed to execute python3")?;
    if output.status.success() {
        println!("✅ Successfully connected to the pyannote models.");
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let lowered = stderr.to_lowercase();
    if lowered.contains("401") || lowered.contains("unauthorized") {
        bail!(
            "Invalid token or unauthorized access. Make sure the model license is accepted at https://huggingface.co/{DIARIZATION_MODEL}"
        );
    }
    if lowered.contains("403") || lowered.contains("forbidden") {
        bail!(
            "Access forbidden. You need to accept the model license at https://huggingface.co/{DIARIZATION_MODEL}"
        );
    }
    bail!("Pipeline access failed:\n{}", stderr.trim_end());
}
