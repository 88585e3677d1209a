use anyhow::{Result, bail};
use std::io::{self, BufRead, IsTerminal};
use zeroize::Zeroizing;

pub const PASSPHRASE_ENV: &str = "SALTED_PASSPHRASE";

/// Obtains the passphrase.
///
/// Sources, in order: the `SALTED_PASSPHRASE` environment variable, one line
/// of piped stdin (unless stdin carries the data to process), an interactive
/// prompt. `confirm` asks twice on a terminal, for new files.
pub fn read_passphrase(stdin_is_data: bool, confirm: bool) -> Result<Zeroizing<String>> {
    //  Environment Variable
    //  SALTED_PASSPHRASE="supersecret" salted encrypt notes.txt
    if let Ok(pw) = std::env::var(PASSPHRASE_ENV) {
        let pw = Zeroizing::new(pw);
        if !pw.is_empty() {
            return Ok(pw);
        }
    }

    //  stdin (Pipeline)
    //  echo "supersecret" | salted decrypt notes.txt.salted
    if !stdin_is_data && !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().lock().read_line(&mut buf)?;
        trim_newline(&mut buf);

        if !buf.is_empty() {
            return Ok(buf);
        }
        bail!("passphrase cannot be empty");
    }

    //  Interactive (TTY)
    let pw = Zeroizing::new(rpassword::prompt_password("Passphrase: ")?);
    if pw.is_empty() {
        bail!("passphrase cannot be empty");
    }

    if confirm {
        let again = Zeroizing::new(rpassword::prompt_password("Confirm passphrase: ")?);
        if pw != again {
            bail!("passphrases do not match");
        }
    }

    Ok(pw)
}

fn trim_newline(s: &mut String) {
    while s.ends_with('\n') || s.ends_with('\r') {
        s.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_crlf() {
        let mut s = String::from("secret\r\n");
        trim_newline(&mut s);
        assert_eq!(s, "secret");
    }

    #[test]
    fn keeps_inner_whitespace() {
        let mut s = String::from(" two words \n");
        trim_newline(&mut s);
        assert_eq!(s, " two words ");
    }
}
