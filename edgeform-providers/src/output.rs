//! Plain-text tables for `output_text` attributes

/// Render rows under a title and column headers, padding every column
pub(crate) fn table(title: &str, headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.len());
            }
        }
    }

    let line = |cells: &mut dyn Iterator<Item = &str>| -> String {
        let padded: Vec<String> = cells
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        format!("| {} |", padded.join(" | "))
    };

    let rule = format!(
        "+{}+",
        widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+")
    );

    let mut out = vec![title.to_string(), rule.clone()];
    out.push(line(&mut headers.iter().copied()));
    out.push(rule.clone());
    for row in rows {
        out.push(line(&mut row.iter().map(String::as_str)));
    }
    out.push(rule);
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_columns_to_widest_cell() {
        let rendered = table(
            "rate policies",
            &["ID", "NAME"],
            &[
                vec!["1".to_string(), "Page View Requests".to_string()],
                vec!["22".to_string(), "POST".to_string()],
            ],
        );
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "rate policies");
        assert_eq!(lines[1], "+----+--------------------+");
        assert_eq!(lines[2], "| ID | NAME               |");
        assert_eq!(lines[4], "| 1  | Page View Requests |");
        assert_eq!(lines[5], "| 22 | POST               |");
    }
}
