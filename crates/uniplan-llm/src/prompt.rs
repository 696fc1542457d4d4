use anyhow::{bail, Result};
use crate::types::Message;

/// A system + human prompt pair with `{name}` placeholders.
///
/// `{{` and `}}` render as literal braces, so JSON examples can be embedded
/// in the template text.
#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    pub system: &'static str,
    pub human: &'static str,
}

impl PromptTemplate {
    pub const fn new(system: &'static str, human: &'static str) -> Self {
        Self { system, human }
    }

    /// Render both halves into chat messages
    pub fn render(&self, vars: &[(&str, &str)]) -> Result<Vec<Message>> {
        Ok(vec![
            Message::system(render_template(self.system, vars)?),
            Message::user(render_template(self.human, vars)?),
        ])
    }
}

/// Substitute `{name}` placeholders; unknown names are an error
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for nc in chars.by_ref() {
                    if nc == '}' {
                        closed = true;
                        break;
                    }
                    name.push(nc);
                }
                if !closed {
                    bail!("Unclosed placeholder '{{{}' in prompt template", name);
                }
                match vars.iter().find(|(key, _)| *key == name) {
                    Some((_, value)) => out.push_str(value),
                    None => bail!("Missing prompt variable '{}'", name),
                }
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}
