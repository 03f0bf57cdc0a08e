//! Line splitting for `rosca shell`.

use anyhow::bail;

/// Split a shell line into arguments. Whitespace separates arguments;
/// single or double quotes group words, so `--name "Hina Baji"` is two.
pub fn split_line(line: &str) -> anyhow::Result<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => current.push(ch),
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                in_arg = true;
            }
            None if ch.is_whitespace() => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            None => {
                current.push(ch);
                in_arg = true;
            }
        }
    }
    if let Some(q) = quote {
        bail!("unterminated {q} quote");
    }
    if in_arg {
        args.push(current);
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(split_line("  member list  c1 ").unwrap(), ["member", "list", "c1"]);
    }

    #[test]
    fn quotes_group_words() {
        assert_eq!(
            split_line(r#"committee add --name "Street Fund" --phone '0300 1234'"#).unwrap(),
            ["committee", "add", "--name", "Street Fund", "--phone", "0300 1234"]
        );
    }

    #[test]
    fn empty_quotes_are_an_argument() {
        assert_eq!(split_line(r#"--phone """#).unwrap(), ["--phone", ""]);
    }

    #[test]
    fn blank_line_is_empty() {
        assert!(split_line("   ").unwrap().is_empty());
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        assert!(split_line(r#"--name "Hina"#).is_err());
    }
}
