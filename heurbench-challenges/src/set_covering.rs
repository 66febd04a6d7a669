use crate::{
    tokens::{non_blank_lines, Tokens},
    ConstraintViolation, ParseError, ProblemInstance, Sense,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

impl_problem_domain! {
    SetCovering {
        name: "set_covering",
        sense: Sense::Minimize,
        signature: ["m", "n", "costs", "row_cover"],
        timeout_secs: 60,
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Solution {
    /// 1-based column ids.
    pub selected_columns: Vec<usize>,
}

impl_solution_from_value!(Solution);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Instance {
    pub num_rows: usize,
    pub num_columns: usize,
    pub costs: Vec<f64>,
    /// For each row, the 1-based columns that cover it.
    pub row_cover: Vec<Vec<usize>>,
}

impl Instance {
    pub fn evaluate_total_cost(&self, solution: &Solution) -> Result<f64, ConstraintViolation> {
        let mut selected = vec![false; self.num_columns + 1];
        for &column in &solution.selected_columns {
            if column == 0 || column > self.num_columns {
                return Err(ConstraintViolation::OutOfBounds {
                    entity: format!("column {}", column),
                    detail: format!("valid columns are 1..={}", self.num_columns),
                });
            }
            if selected[column] {
                return Err(ConstraintViolation::malformed(format!(
                    "column {} selected more than once",
                    column
                )));
            }
            selected[column] = true;
        }
        if let Some(row) = self
            .row_cover
            .iter()
            .position(|columns| !columns.iter().any(|&c| selected[c]))
        {
            return Err(ConstraintViolation::Uncovered { row: row + 1 });
        }
        Ok(solution
            .selected_columns
            .iter()
            .map(|&c| self.costs[c - 1])
            .sum())
    }
}

impl ProblemInstance for Instance {
    fn arguments(&self) -> Vec<Value> {
        vec![
            json!(self.num_rows),
            json!(self.num_columns),
            json!(self.costs),
            json!(self.row_cover),
        ]
    }

    fn verify(&self, output: &Value) -> Result<f64, ConstraintViolation> {
        let solution = Solution::try_from(output)?;
        self.evaluate_total_cost(&solution)
    }
}

type Matcher = fn(&str) -> Result<Instance, ParseError>;

/// Detects which of the three table encodings the text uses and parses it.
pub fn parse_instances(text: &str) -> Result<Vec<Instance>, ParseError> {
    let matchers: [(&str, Matcher); 3] = [
        ("sparse by column", parse_by_column),
        ("sparse by row", parse_by_row),
        ("unit cost by row", parse_unit_cost_by_row),
    ];
    let mut reasons = Vec::new();
    for (name, matcher) in matchers {
        match matcher(text) {
            Ok(instance) => return Ok(vec![instance]),
            Err(e) => reasons.push(format!("{}: {}", name, e)),
        }
    }
    Err(ParseError::UnknownFormat {
        reason: reasons.join("; "),
    })
}

/// `m n` header line, then one line per column: `cost k row_1 .. row_k`.
pub fn parse_by_column(text: &str) -> Result<Instance, ParseError> {
    let lines = non_blank_lines(text);
    let header = lines.first().ok_or_else(|| ParseError::MissingTokens {
        context: "header".to_string(),
        expected: 2,
        found: 0,
    })?;
    let mut tokens = Tokens::new(header);
    let (num_rows, num_columns) = read_header(&mut tokens)?;
    if !tokens.is_exhausted() {
        return Err(invalid("header", "expected exactly 'm n'"));
    }
    if lines.len() - 1 != num_columns {
        return Err(invalid(
            "column lines",
            &format!("expected {} lines, found {}", num_columns, lines.len() - 1),
        ));
    }

    let mut costs = Vec::new();
    let mut columns = Vec::new();
    for (j, line) in lines[1..].iter().enumerate() {
        let context = format!("column {}", j + 1);
        let mut tokens = Tokens::new(line);
        costs.push(tokens.next_f64(&context)?);
        let count = tokens.next_usize(&context)?;
        let rows = tokens.take_usizes(count, &context)?;
        if let Some(&row) = rows.iter().find(|&&r| r == 0 || r > num_rows) {
            return Err(invalid(&context, &format!("row {} out of range", row)));
        }
        if !tokens.is_exhausted() {
            return Err(invalid(&context, "trailing tokens"));
        }
        columns.push(rows);
    }
    check_declared(
        "rows",
        num_rows,
        columns.iter().map(Vec::len).sum(),
    )?;

    let mut row_cover = vec![Vec::new(); num_rows];
    for (j, rows) in columns.iter().enumerate() {
        for &row in rows {
            row_cover[row - 1].push(j + 1);
        }
    }
    Ok(Instance {
        num_rows,
        num_columns,
        costs,
        row_cover,
    })
}

/// `m n`, `n` column costs, then per row `k col_1 .. col_k`, wrapping freely.
pub fn parse_by_row(text: &str) -> Result<Instance, ParseError> {
    let mut tokens = Tokens::new(text);
    let (num_rows, num_columns) = read_header(&mut tokens)?;
    let costs = tokens.take_f64s(num_columns, "column costs")?;
    let row_cover = read_rows(&mut tokens, num_rows, num_columns)?;
    Ok(Instance {
        num_rows,
        num_columns,
        costs,
        row_cover,
    })
}

/// `m n`, then per row `k col_1 .. col_k`; every column costs 1.
pub fn parse_unit_cost_by_row(text: &str) -> Result<Instance, ParseError> {
    let mut tokens = Tokens::new(text);
    let (num_rows, num_columns) = read_header(&mut tokens)?;
    let row_cover = read_rows(&mut tokens, num_rows, num_columns)?;
    check_declared(
        "columns",
        num_columns,
        row_cover.iter().map(Vec::len).sum(),
    )?;
    Ok(Instance {
        num_rows,
        num_columns,
        costs: vec![1.0; num_columns],
        row_cover,
    })
}

fn read_header(tokens: &mut Tokens) -> Result<(usize, usize), ParseError> {
    Ok((
        tokens.next_usize("number of rows")?,
        tokens.next_usize("number of columns")?,
    ))
}

fn read_rows(
    tokens: &mut Tokens,
    num_rows: usize,
    num_columns: usize,
) -> Result<Vec<Vec<usize>>, ParseError> {
    let mut row_cover = Vec::new();
    for i in 0..num_rows {
        let context = format!("row {}", i + 1);
        let count = tokens.next_usize(&context)?;
        let columns = tokens.take_usizes(count, &context)?;
        if let Some(&column) = columns.iter().find(|&&c| c == 0 || c > num_columns) {
            return Err(invalid(&context, &format!("column {} out of range", column)));
        }
        row_cover.push(columns);
    }
    if !tokens.is_exhausted() {
        return Err(invalid(
            "row records",
            &format!("trailing tokens after {} tokens", tokens.consumed()),
        ));
    }
    Ok(row_cover)
}

/// A declared row or column count may not exceed the number of entries the text lists.
fn check_declared(what: &str, declared: usize, entries: usize) -> Result<(), ParseError> {
    if declared > entries {
        return Err(invalid(
            &format!("number of {}", what),
            &format!("declares {} {} but lists only {} entries", declared, what, entries),
        ));
    }
    Ok(())
}

fn invalid(context: &str, reason: &str) -> ParseError {
    ParseError::Invalid {
        context: context.to_string(),
        reason: reason.to_string(),
    }
}
