//! Comment banners that open each block of generated DDL

const HEADERS: [&str; 4] = ["#", "ORACLE", "MYSQL", "SUGGEST"];

/// Title of the banner above each table in the primary script
pub const REVERSE_TITLE: &str = "oracle table reverse sql";

/// Title of the banner above each group of statements needing review
pub const COMPATIBILITY_TITLE: &str = "oracle table check constraint maybe mysql has compatibility, skip";

/// Suggestion shown for the primary script
pub const SUGGEST_MANUAL: &str = "Manual";

/// Suggestion shown for compatibility groups
pub const SUGGEST_MANUAL_CREATE: &str = "Manual Create";

/// Render a `/* ... */` banner naming the source and target table
/// e.g.,
/// ```text
/// /*
///  oracle table reverse sql
/// ┌───────┬──────────┬──────────┬─────────┐
/// │ #     │ ORACLE   │ MYSQL    │ SUGGEST │
/// ├───────┼──────────┼──────────┼─────────┤
/// │ TABLE │ MARVIN.T │ steven.t │ Manual  │
/// └───────┴──────────┴──────────┴─────────┘
/// */
/// ```
pub fn render_banner(title: &str, source: &str, target: &str, suggest: &str) -> String {
    let row = ["TABLE", source, target, suggest];
    format!("/*\n {}\n{}\n*/\n", title, render_grid(&HEADERS, &[row]))
}

/// Box-drawing grid with a header row
fn render_grid<const N: usize>(headers: &[&str; N], rows: &[[&str; N]]) -> String {
    let widths: Vec<usize> = (0..N)
        .map(|i| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(headers[i].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let rule = |left: &str, mid: &str, right: &str| {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{}{}{}", left, segments.join(mid), right)
    };
    let line = |cells: &[&str; N]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!(" {}{} ", cell, " ".repeat(w - cell.chars().count())))
            .collect();
        format!("│{}│", padded.join("│"))
    };

    let mut lines = vec![rule("┌", "┬", "┐"), line(headers), rule("├", "┼", "┤")];
    lines.extend(rows.iter().map(|r| line(r)));
    lines.push(rule("└", "┴", "┘"));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_banner() {
        let banner = render_banner(REVERSE_TITLE, "MARVIN.T", "steven.t", SUGGEST_MANUAL);
        let expected = "\
/*
 oracle table reverse sql
┌───────┬──────────┬──────────┬─────────┐
│ #     │ ORACLE   │ MYSQL    │ SUGGEST │
├───────┼──────────┼──────────┼─────────┤
│ TABLE │ MARVIN.T │ steven.t │ Manual  │
└───────┴──────────┴──────────┴─────────┘
*/
";
        assert_eq!(banner, expected);
    }

    #[test]
    fn test_columns_widen_to_longest_cell() {
        let banner = render_banner(
            COMPATIBILITY_TITLE,
            "MARVIN.ORDER_LINES",
            "steven.order_lines",
            SUGGEST_MANUAL_CREATE,
        );
        assert!(banner.contains("│ TABLE │ MARVIN.ORDER_LINES │ steven.order_lines │ Manual Create │"));
        assert!(banner.contains("│ #     │ ORACLE             │ MYSQL              │ SUGGEST       │"));
    }
}
