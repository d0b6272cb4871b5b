use std::io::{stdin, stdout, Write};
use std::path::{Path, PathBuf};

pub fn read_from_stdin(hidden: bool, prompt: &str) -> std::io::Result<String> {
    if hidden {
        rpassword::prompt_password(prompt)
    } else {
        print!("{}", prompt);
        stdout().flush()?;
        let mut read = String::new();
        stdin().read_line(&mut read)?;

        Ok(read.trim_end().to_string())
    }
}

/// Expands a leading `~/` against the user's home directory. Paths without
/// the prefix (and `~user` forms) pass through unchanged.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Some(rest) = path.to_str().and_then(|p| p.strip_prefix("~/")) else {
        return path.to_path_buf();
    };

    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
