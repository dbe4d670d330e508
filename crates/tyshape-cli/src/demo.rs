//! Built-in samples for `tyshape demo`.

use anyhow::Result;
use termcolor::{Color, ColorSpec, WriteColor};

use crate::render;

const GAME_RESPONSE: &str = r#"type GameResponse = {
  id: number;
  date: string;
  time: string;
  timestamp: number;
  timezone: string;
  stage: string | null;
  week: string | null;
  venue: string | null;
  status: Status;
  winner: "home" | "away";
  identfier: "true";
};"#;

const BUTTON: &str = r#"type Button = {
    variant: "solid" | "text";
    };"#;

const INLINE_DECLARE: &str = "type InlineDeclare = string | number;\n";

const USER: &str = r#"interface User {
  id: number;
  name: string;
  status: "active" | "inactive";
}"#;

const COMPLEX_ALIAS: &str = "type ComplexAlias = { id: number; name: string; } & { age: number };\n";

pub const SAMPLES: &[(&str, &str)] = &[
    ("object alias", GAME_RESPONSE),
    ("union field", BUTTON),
    ("non-object alias", INLINE_DECLARE),
    ("interface", USER),
    ("intersection of object literals", COMPLEX_ALIAS),
];

/// Print each sample followed by its converted shape.
pub fn run<W: WriteColor>(out: &mut W, pretty: bool) -> Result<()> {
    let mut heading = ColorSpec::new();
    heading.set_fg(Some(Color::Cyan)).set_bold(true);

    for (title, source) in SAMPLES {
        out.set_color(&heading)?;
        writeln!(out, "== {title} ==")?;
        out.reset()?;

        writeln!(out, "{}", source.trim_end())?;
        let shape = tyshape_core::convert(source);
        writeln!(out, "{}\n", render(&shape, pretty)?)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcolor::NoColor;

    #[test]
    fn test_demo_prints_every_sample() {
        let mut out = NoColor::new(Vec::new());
        run(&mut out, false).unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();

        for (title, _) in SAMPLES {
            assert!(text.contains(&format!("== {title} ==")), "missing {title}");
        }
        assert!(text.contains(r#"{"inlinedeclare":["string","number"]}"#));
        assert!(text.contains(
            r#"{"complexalias":["{ id: number; name: string; }","{ age: number }"]}"#
        ));
    }

    #[test]
    fn test_samples_parse_cleanly() {
        for (title, source) in SAMPLES {
            let conversion = tyshape_core::convert_with_diagnostics(source);
            assert!(conversion.errors.is_empty(), "{title}: {:?}", conversion.errors);
            assert_eq!(conversion.shape.len(), 1, "{title}");
        }
    }
}
