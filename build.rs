use std::{env, process::Command};

const KAGI_FALLBACK_ENDPOINT: &str = "https://kagi.com/api/v0";

fn main() {
    println!("cargo:rerun-if-env-changed=KAGI_API_KEY");
    println!("cargo:rerun-if-env-changed=KAGI_URL");

    // Warnings only; the build never fails on environment problems.
    check_env("KAGI_API_KEY");
    let kagi_url = check_env("KAGI_URL");
    check_kagi_connectivity(kagi_url.as_deref());
}

fn check_env(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                println!("cargo:warning={} environment variable is set but empty", key);
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Err(_) => {
            println!("cargo:warning={} environment variable is not set", key);
            None
        }
    }
}

fn check_kagi_connectivity(url: Option<&str>) {
    let target = url.unwrap_or(KAGI_FALLBACK_ENDPOINT);
    match curl_status_code(target) {
        Ok(code) if code == "000" => println!(
            "cargo:warning=Kagi API endpoint is unreachable ({}), curl returned status code 000",
            target
        ),
        Ok(_) => {}
        Err(reason) => println!(
            "cargo:warning=Failed to check Kagi API endpoint ({}): {}",
            target, reason
        ),
    }
}

fn curl_status_code(url: &str) -> Result<String, String> {
    let output = Command::new("curl")
        .args(["--silent", "--show-error", "--location", "--max-time", "5"])
        .args(["--output", "/dev/null", "--write-out", "%{http_code}"])
        .arg(url)
        .output()
        .map_err(|err| format!("unable to execute curl (is it installed and in PATH?): {}", err))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "curl exited with status {:?}: {}",
            output.status.code(),
            stderr.trim()
        ));
    }

    let code = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if code.is_empty() {
        return Err("curl produced empty status code".to_string());
    }
    Ok(code)
}
