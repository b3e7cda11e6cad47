//! Line-oriented, comment-tolerant interchange format for linear programs.
//!
//! ```text
//! # anything after a '#' is a comment
//! maximize                     # or "minimize"
//! 3,2                          # rows,cols
//! "x","y"                      # column labels
//! "cap_x",1,0,<=,4             # "label",coefficients...,relation,rhs
//! "cap_y",0,2,<=,12
//! "mix",3,2,<=,18
//! "profit",3,5                 # "objective label",costs...
//! ```

use crate::program::{LinearProgram, Relation};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },
    #[error("line {line}: expected 'minimize' or 'maximize', found '{found}'")]
    BadDirection { line: usize, found: String },
    #[error("line {line}: expected 'rows,cols'")]
    BadDimensions { line: usize },
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: invalid number '{field}'")]
    BadNumber { line: usize, field: String },
    #[error("line {line}: invalid relation '{token}', expected <=, == or >=")]
    BadRelation { line: usize, token: String },
    #[error("line {line}: unterminated quoted label")]
    UnterminatedQuote { line: usize },
}

/// Parse a model from interchange-format text.
pub fn parse(source: &str) -> Result<LinearProgram, ParseError> {
    let mut lines = content_lines(source);

    // direction
    let (line_no, direction) = next_line(&mut lines, "minimize/maximize line")?;
    let minimize = match direction.to_ascii_lowercase().as_str() {
        "minimize" => true,
        "maximize" => false,
        _ => {
            return Err(ParseError::BadDirection {
                line: line_no,
                found: direction,
            });
        }
    };

    // rows,cols
    let (line_no, dims) = next_line(&mut lines, "dimension line")?;
    let (rows, cols) = parse_dimensions(line_no, &dims)?;

    let mut lp = LinearProgram::zeroed(rows, cols);
    lp.minimize = minimize;

    // column labels
    let (line_no, labels) = next_line(&mut lines, "column label line")?;
    let fields = split_fields(line_no, &labels)?;
    if fields.len() != cols {
        return Err(ParseError::FieldCount {
            line: line_no,
            expected: cols,
            found: fields.len(),
        });
    }
    lp.col_labels = fields;

    // constraint rows: "label",a_1,...,a_cols,relation,b
    for i in 0..rows {
        let (line_no, text) = next_line(&mut lines, "constraint row")?;
        let fields = split_fields(line_no, &text)?;
        if fields.len() != cols + 3 {
            return Err(ParseError::FieldCount {
                line: line_no,
                expected: cols + 3,
                found: fields.len(),
            });
        }
        lp.row_labels[i] = fields[0].clone();
        for j in 0..cols {
            lp.a[i][j] = parse_number(line_no, &fields[1 + j])?;
        }
        lp.relations[i] = parse_relation(line_no, &fields[cols + 1])?;
        lp.b[i] = parse_number(line_no, &fields[cols + 2])?;
    }

    // objective: "label",c_1,...,c_cols
    let (line_no, text) = next_line(&mut lines, "objective row")?;
    let fields = split_fields(line_no, &text)?;
    if fields.len() != cols + 1 {
        return Err(ParseError::FieldCount {
            line: line_no,
            expected: cols + 1,
            found: fields.len(),
        });
    }
    lp.objective_label = fields[0].clone();
    for j in 0..cols {
        lp.c[j] = parse_number(line_no, &fields[1 + j])?;
    }

    Ok(lp)
}

/// Render a model in interchange format. `parse(&write(lp))` reproduces the
/// model's coefficients, relations and labels.
pub fn write(lp: &LinearProgram) -> String {
    let mut out = String::new();
    out.push_str(if lp.minimize { "minimize\n" } else { "maximize\n" });
    out.push_str(&format!("{},{}\n", lp.rows, lp.cols));

    let labels: Vec<String> = (0..lp.cols).map(|j| quoted(&lp.col_labels, j)).collect();
    out.push_str(&labels.join(","));
    out.push('\n');

    for i in 0..lp.rows {
        out.push_str(&quoted(&lp.row_labels, i));
        for j in 0..lp.cols {
            out.push_str(&format!(",{}", lp.a[i][j]));
        }
        out.push_str(&format!(",{},{}\n", lp.relations[i].as_str(), lp.b[i]));
    }

    out.push_str(&format!("\"{}\"", lp.objective_label));
    for j in 0..lp.cols {
        out.push_str(&format!(",{}", lp.c[j]));
    }
    out.push('\n');
    out
}

fn quoted(labels: &[String], i: usize) -> String {
    format!("\"{}\"", labels.get(i).map(String::as_str).unwrap_or(""))
}

/// Content lines with their 1-based line numbers: comments stripped, blanks
/// dropped, surrounding whitespace trimmed. A '#' inside a quoted label does
/// not start a comment.
fn content_lines(source: &str) -> impl Iterator<Item = (usize, String)> + '_ {
    source.lines().enumerate().filter_map(|(idx, raw)| {
        let stripped = strip_comment(raw);
        let trimmed = stripped.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some((idx + 1, trimmed.to_string()))
        }
    })
}

fn strip_comment(line: &str) -> &str {
    let mut in_quotes = false;
    for (pos, ch) in line.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '#' if !in_quotes => return &line[..pos],
            _ => {}
        }
    }
    line
}

fn next_line(
    lines: &mut impl Iterator<Item = (usize, String)>,
    expected: &str,
) -> Result<(usize, String), ParseError> {
    lines.next().ok_or_else(|| ParseError::UnexpectedEof {
        expected: expected.to_string(),
    })
}

fn parse_dimensions(line: usize, text: &str) -> Result<(usize, usize), ParseError> {
    let mut parts = text.splitn(2, ',');
    let rows = parts.next().map(str::trim).unwrap_or("");
    let cols = parts.next().map(str::trim).unwrap_or("");
    match (rows.parse::<usize>(), cols.parse::<usize>()) {
        (Ok(r), Ok(c)) if r > 0 && c > 0 => Ok((r, c)),
        _ => Err(ParseError::BadDimensions { line }),
    }
}

fn parse_number(line: usize, field: &str) -> Result<f64, ParseError> {
    field.parse::<f64>().map_err(|_| ParseError::BadNumber {
        line,
        field: field.to_string(),
    })
}

fn parse_relation(line: usize, token: &str) -> Result<Relation, ParseError> {
    match token {
        "<=" => Ok(Relation::Le),
        "==" => Ok(Relation::Eq),
        ">=" => Ok(Relation::Ge),
        _ => Err(ParseError::BadRelation {
            line,
            token: token.to_string(),
        }),
    }
}

/// Split a content line into comma-separated fields, unwrapping quoted labels
/// and trimming whitespace around every field. Commas inside quotes do not
/// split.
fn split_fields(line: usize, text: &str) -> Result<Vec<String>, ParseError> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in text.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current).trim().to_string());
            }
            _ => current.push(ch),
        }
    }
    if in_quotes {
        return Err(ParseError::UnterminatedQuote { line });
    }
    fields.push(current.trim().to_string());
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# production planning example
maximize
3,2
"x","y"

"cap_x", 1, 0, <=, 4     # x alone is capped
"cap_y", 0, 2, <=, 12
"mix",   3, 2, <=, 18
"profit", 3, 5
"#;

    #[test]
    fn test_parse_sample() {
        let lp = parse(SAMPLE).unwrap();
        assert!(!lp.minimize);
        assert_eq!(lp.rows, 3);
        assert_eq!(lp.cols, 2);
        assert_eq!(lp.col_labels, vec!["x", "y"]);
        assert_eq!(lp.row_labels, vec!["cap_x", "cap_y", "mix"]);
        assert_eq!(lp.a, vec![vec![1.0, 0.0], vec![0.0, 2.0], vec![3.0, 2.0]]);
        assert_eq!(lp.b, vec![4.0, 12.0, 18.0]);
        assert_eq!(
            lp.relations,
            vec![Relation::Le, Relation::Le, Relation::Le]
        );
        assert_eq!(lp.c, vec![3.0, 5.0]);
        assert_eq!(lp.objective_label, "profit");
        assert!(lp.is_valid());
    }

    #[test]
    fn test_parse_all_relations_and_negative_numbers() {
        let text = "minimize\n3,2\n\"a\",\"b\"\n\
                    \"lo\",1,-1,>=,-5\n\
                    \"eq\",2,2,==,10\n\
                    \"hi\",-3,0.5,<=,7.25\n\
                    \"cost\",1.5,-2\n";
        let lp = parse(text).unwrap();
        assert!(lp.minimize);
        assert_eq!(
            lp.relations,
            vec![Relation::Ge, Relation::Eq, Relation::Le]
        );
        assert_eq!(lp.a[0], vec![1.0, -1.0]);
        assert_eq!(lp.b, vec![-5.0, 10.0, 7.25]);
        assert_eq!(lp.c, vec![1.5, -2.0]);
    }

    #[test]
    fn test_label_may_contain_comma_and_hash() {
        let text = "minimize\n1,1\n\"amount, total\"\n\"row #1\",1,<=,2\n\"Z\",1\n";
        let lp = parse(text).unwrap();
        assert_eq!(lp.col_labels[0], "amount, total");
        assert_eq!(lp.row_labels[0], "row #1");
    }

    #[test]
    fn test_write_then_parse_is_faithful() {
        let mut lp = parse(SAMPLE).unwrap();
        lp.minimize = true;
        let text = write(&lp);
        let reparsed = parse(&text).unwrap();
        assert_eq!(reparsed, lp);
    }

    #[test]
    fn test_truncated_input() {
        let err = parse("maximize\n2,2\n\"x\",\"y\"\n").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_bad_direction() {
        let err = parse("optimize\n1,1\n\"x\"\n\"r\",1,<=,1\n\"Z\",1\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::BadDirection {
                line: 1,
                found: "optimize".to_string()
            }
        );
    }

    #[test]
    fn test_bad_relation_token() {
        let err = parse("minimize\n1,1\n\"x\"\n\"r\",1,=<,1\n\"Z\",1\n").unwrap_err();
        assert!(matches!(err, ParseError::BadRelation { line: 4, .. }));
    }

    #[test]
    fn test_field_count_mismatch() {
        let err = parse("minimize\n1,2\n\"x\",\"y\"\n\"r\",1,<=,1\n\"Z\",1,2\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::FieldCount {
                line: 4,
                expected: 5,
                found: 4
            }
        );
    }

    #[test]
    fn test_bad_number() {
        let err = parse("minimize\n1,1\n\"x\"\n\"r\",one,<=,1\n\"Z\",1\n").unwrap_err();
        assert!(matches!(err, ParseError::BadNumber { line: 4, .. }));
    }

    #[test]
    fn test_unterminated_quote() {
        let err = parse("minimize\n1,1\n\"x\n\"r\",1,<=,1\n\"Z\",1\n").unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedQuote { line: 3 }));
    }

    #[test]
    fn test_bad_dimensions() {
        let err = parse("minimize\nnope\n").unwrap_err();
        assert_eq!(err, ParseError::BadDimensions { line: 2 });
    }
}
