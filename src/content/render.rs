//! Text rendering for algorithm pages.

use std::fmt;

use super::difficulty::DifficultyInfo;
use super::model::Algorithm;

/// Convert lightly formatted text to HTML paragraphs.
///
/// Each line becomes a paragraph, blank lines become `<br>`, `**x**` becomes
/// `<strong>x</strong>` and lines starting with `•` get the bullet class.
pub fn format_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    text.split('\n')
        .map(|line| {
            let line = line.trim();
            if line.is_empty() {
                return "<br>".to_string();
            }
            let line = emphasize(line);
            if line.starts_with('•') {
                format!("<p class=\"bullet-point\">{}</p>", line)
            } else {
                format!("<p>{}</p>", line)
            }
        })
        .collect()
}

/// Replace `**x**` pairs with `<strong>x</strong>`; an unpaired `**` is kept.
fn emphasize(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(start) = rest.find("**") {
        let after = &rest[start + 2..];
        match after.find("**") {
            Some(end) => {
                out.push_str(&rest[..start]);
                out.push_str("<strong>");
                out.push_str(&after[..end]);
                out.push_str("</strong>");
                rest = &after[end + 2..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

/// Plain-text page for the terminal.
pub fn render_summary(algo: &Algorithm) -> String {
    Summary(algo).to_string()
}

/// Terminal layout of one algorithm page.
struct Summary<'a>(&'a Algorithm);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let algo = self.0;
        let difficulty = DifficultyInfo::classify(&algo.difficulty);

        writeln!(f, "{} | دليل", algo.title)?;
        writeln!(f, "{} › {}", algo.category, algo.title)?;
        writeln!(f, "{}", algo.description)?;
        writeln!(f, "{} المستوى: {}", difficulty.icon, difficulty.text)?;
        if !algo.duration.is_empty() {
            writeln!(f, "⏱ {}", algo.duration)?;
        }

        if !algo.prerequisites.is_empty() {
            writeln!(f, "\nالمتطلبات:")?;
            for prereq in &algo.prerequisites {
                writeln!(f, "  ✓ {}", prereq)?;
            }
        }

        writeln!(f, "\nالمصادر:")?;
        if algo.resources.is_empty() {
            writeln!(f, "  لا توجد مصادر متاحة حالياً")?;
        }
        for resource in &algo.resources {
            writeln!(
                f,
                "  {} {} [{}] {} {} <{}>",
                resource.kind.icon(),
                resource.title,
                resource.language.badge(),
                DifficultyInfo::classify(&resource.difficulty).icon,
                resource.difficulty,
                resource.url
            )?;
        }

        writeln!(f, "\nالمسائل:")?;
        if algo.problems.is_empty() {
            writeln!(f, "  لا توجد مسائل متاحة حالياً")?;
        }
        for problem in &algo.problems {
            writeln!(
                f,
                "  {} [{}] {} {} <{}>",
                problem.title,
                problem.platform,
                DifficultyInfo::classify(&problem.difficulty).icon,
                problem.difficulty,
                problem.url
            )?;
        }

        if !algo.related.is_empty() {
            writeln!(f, "\nمواضيع ذات صلة:")?;
            for topic in &algo.related {
                writeln!(f, "  {} (algorithm.html?id={})", topic.title, topic.id)?;
            }
        }

        Ok(())
    }
}
