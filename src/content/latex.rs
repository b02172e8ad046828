//! LaTeX to plain Unicode conversion for terminal display.
//!
//! Covers the subset used by the course content and typical tutor replies:
//! fractions, roots, scripts, `\text`, `cases` and common symbols. Anything
//! unknown is passed through without its backslash.

/// Convert a LaTeX math fragment into readable Unicode.
pub fn prettify(src: &str) -> String {
    let mut parser = Parser {
        chars: src.chars().collect(),
        pos: 0,
    };
    let raw = parser.sequence(None);
    tidy(&raw)
}

/// Replace `$…$` and `$$…$$` spans in prose with their prettified form.
pub fn prettify_inline_math(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('$') {
        let (before, after) = rest.split_at(start);
        out.push_str(before);
        let delim = if after.starts_with("$$") { "$$" } else { "$" };
        let body = &after[delim.len()..];
        match body.find(delim) {
            Some(end) if end > 0 => {
                out.push_str(&prettify(&body[..end]));
                rest = &body[end + delim.len()..];
            },
            _ => {
                out.push_str(delim);
                rest = body;
            },
        }
    }
    out.push_str(rest);
    out
}

fn symbol(name: &str) -> Option<&'static str> {
    Some(match name {
        "to" | "rightarrow" => "→",
        "Rightarrow" | "implies" => "⇒",
        "leftarrow" => "←",
        "iff" | "Leftrightarrow" => "⇔",
        "infty" => "∞",
        "int" => "∫",
        "iint" => "∬",
        "oint" => "∮",
        "sum" => "Σ",
        "prod" => "Π",
        "partial" => "∂",
        "nabla" => "∇",
        "cdot" => "·",
        "times" => "×",
        "div" => "÷",
        "pm" => "±",
        "mp" => "∓",
        "approx" => "≈",
        "neq" | "ne" => "≠",
        "leq" | "le" => "≤",
        "geq" | "ge" => "≥",
        "in" => "∈",
        "notin" => "∉",
        "exists" => "∃",
        "forall" => "∀",
        "cdots" | "ldots" | "dots" => "…",
        "circ" => "∘",
        "quad" => "  ",
        "qquad" => "    ",
        "alpha" => "α",
        "beta" => "β",
        "gamma" => "γ",
        "delta" => "δ",
        "epsilon" | "varepsilon" => "ε",
        "theta" => "θ",
        "lambda" => "λ",
        "mu" => "μ",
        "pi" => "π",
        "rho" => "ρ",
        "sigma" => "σ",
        "tau" => "τ",
        "phi" | "varphi" => "φ",
        "omega" => "ω",
        "Delta" => "Δ",
        "Sigma" => "Σ",
        "Omega" => "Ω",
        _ => return None,
    })
}

fn superscript(c: char) -> Option<char> {
    Some(match c {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        '+' => '⁺',
        '-' | '−' => '⁻',
        '=' => '⁼',
        '(' => '⁽',
        ')' => '⁾',
        'a' => 'ᵃ',
        'b' => 'ᵇ',
        'c' => 'ᶜ',
        'd' => 'ᵈ',
        'e' => 'ᵉ',
        'f' => 'ᶠ',
        'g' => 'ᵍ',
        'h' => 'ʰ',
        'i' => 'ⁱ',
        'j' => 'ʲ',
        'k' => 'ᵏ',
        'm' => 'ᵐ',
        'n' => 'ⁿ',
        'p' => 'ᵖ',
        'r' => 'ʳ',
        's' => 'ˢ',
        't' => 'ᵗ',
        'u' => 'ᵘ',
        'x' => 'ˣ',
        'y' => 'ʸ',
        'z' => 'ᶻ',
        _ => return None,
    })
}

fn subscript(c: char) -> Option<char> {
    Some(match c {
        '0' => '₀',
        '1' => '₁',
        '2' => '₂',
        '3' => '₃',
        '4' => '₄',
        '5' => '₅',
        '6' => '₆',
        '7' => '₇',
        '8' => '₈',
        '9' => '₉',
        '+' => '₊',
        '-' | '−' => '₋',
        '=' => '₌',
        '(' => '₍',
        ')' => '₎',
        'a' => 'ₐ',
        'e' => 'ₑ',
        'h' => 'ₕ',
        'i' => 'ᵢ',
        'j' => 'ⱼ',
        'k' => 'ₖ',
        'l' => 'ₗ',
        'm' => 'ₘ',
        'n' => 'ₙ',
        'o' => 'ₒ',
        'p' => 'ₚ',
        'r' => 'ᵣ',
        's' => 'ₛ',
        't' => 'ₜ',
        'u' => 'ᵤ',
        'v' => 'ᵥ',
        'x' => 'ₓ',
        _ => return None,
    })
}

/// Script `body` with the Unicode table, or fall back to `^(…)`/`_(…)`.
fn script(body: &str, marker: char, table: fn(char) -> Option<char>) -> String {
    if body.is_empty() {
        return String::new();
    }
    if let Some(mapped) = body.chars().map(table).collect::<Option<String>>() {
        return mapped;
    }
    if body.chars().count() == 1 {
        format!("{marker}{body}")
    } else {
        format!("{marker}({body})")
    }
}

/// Parenthesize unless the operand already reads as one unit.
fn operand(s: &str) -> String {
    let s = s.trim();
    let atomic = s
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '.' | '\'' | '′'))
        || single_group(s.strip_prefix('√').unwrap_or(s));
    if atomic {
        s.to_string()
    } else {
        format!("({s})")
    }
}

fn single_group(s: &str) -> bool {
    if !(s.starts_with('(') && s.ends_with(')')) {
        return false;
    }
    let mut depth = 0usize;
    let last = s.chars().count() - 1;
    for (i, c) in s.chars().enumerate() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 && i != last {
                    return false;
                }
            },
            _ => {},
        }
    }
    depth == 0
}

fn tidy(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_space = false;
    for c in raw.chars() {
        if c == ' ' {
            if !last_space {
                out.push(' ');
            }
            last_space = true;
        } else {
            last_space = false;
            out.push(c);
        }
    }
    out.replace(" ;", ";").trim().to_string()
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// Read until `close` (consumed) or end of input.
    fn sequence(&mut self, close: Option<char>) -> String {
        let mut out = String::new();
        while let Some(c) = self.bump() {
            if Some(c) == close {
                break;
            }
            match c {
                '\\' => self.command(&mut out),
                '{' => {
                    let inner = self.sequence(Some('}'));
                    out.push_str(&inner);
                },
                '^' => {
                    let arg = self.argument();
                    out.push_str(&script(arg.trim(), '^', superscript));
                },
                '_' => {
                    let arg = self.argument();
                    out.push_str(&script(arg.trim(), '_', subscript));
                },
                '&' => out.push(' '),
                _ => out.push(c),
            }
        }
        out
    }

    /// A braced group, a command or a single character.
    fn argument(&mut self) -> String {
        while self.peek() == Some(' ') {
            self.pos += 1;
        }
        match self.bump() {
            Some('{') => self.sequence(Some('}')),
            Some('\\') => {
                let mut out = String::new();
                self.command(&mut out);
                out
            },
            Some(c) => c.to_string(),
            None => String::new(),
        }
    }

    fn command(&mut self, out: &mut String) {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        if start == self.pos {
            match self.bump() {
                Some('\\') => out.push_str("; "),
                Some(',' | ';' | ':' | ' ' | '!') => out.push(' '),
                Some(c) => out.push(c),
                None => out.push('\\'),
            }
            return;
        }

        let name: String = self.chars[start..self.pos].iter().collect();
        match name.as_str() {
            "frac" | "dfrac" | "tfrac" => {
                let num = self.argument();
                let den = self.argument();
                out.push_str(&format!("{}/{}", operand(&num), operand(&den)));
            },
            "sqrt" => {
                let arg = self.argument();
                out.push('√');
                out.push_str(&operand(&arg));
            },
            "text" | "mathrm" | "textbf" | "mathbf" | "mathit" | "operatorname" => {
                let arg = self.argument();
                out.push_str(&arg);
            },
            "begin" => {
                if self.argument() == "cases" {
                    out.push_str("{ ");
                }
            },
            "end" => {
                if self.argument() == "cases" {
                    out.push_str(" }");
                }
            },
            "left" | "right" | "big" | "Big" | "bigg" | "Bigg" => {
                if self.peek() == Some('.') {
                    self.pos += 1;
                }
            },
            other => out.push_str(symbol(other).unwrap_or(other)),
        }
    }
}
