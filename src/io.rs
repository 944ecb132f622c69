//! Plain-text instance parsing and solution serialization.
//!
//! The instance format is: line 1 the plate width, line 2 the circuit count
//! N, then N lines of `width height` pairs. The solution layout mirrors what
//! downstream plotting tools already consume and must be reproduced exactly:
//! `plateWidth height`, the circuit count, one `width height x y [rotated]`
//! line per circuit, a dashed trailer, and the solve time in seconds with
//! four decimal places. The per-circuit dimensions are the raw instance
//! dimensions; the plotting tools perform the swap when they see the
//! `rotated` tag.

use std::{fs, io::Write, path::Path};

use crate::{
    error::{PackError, Result},
    instance::Instance,
    solver::decode::PlacementResult,
};

pub fn read_instance(path: &Path) -> Result<Instance> {
    let text = fs::read_to_string(path)?;
    parse_instance(&text)
}

pub fn parse_instance(text: &str) -> Result<Instance> {
    let mut lines = text.lines();
    let plate_width = parse_int(lines.next(), "plate width")?;
    let count = parse_int(lines.next(), "circuit count")?;
    if count <= 0 {
        return Err(PackError::Validation(format!(
            "circuit count must be positive, got {count}"
        ))
        .into());
    }

    let mut widths = Vec::with_capacity(count as usize);
    let mut heights = Vec::with_capacity(count as usize);
    for i in 0..count {
        let line = lines.next().ok_or_else(|| {
            PackError::Validation(format!("expected {count} circuit lines, found {i}"))
        })?;
        let mut fields = line.split_whitespace();
        widths.push(parse_int(fields.next(), "circuit width")?);
        heights.push(parse_int(fields.next(), "circuit height")?);
        if fields.next().is_some() {
            return Err(PackError::Validation(format!(
                "trailing fields on circuit line {i}: '{line}'"
            ))
            .into());
        }
    }
    Instance::new(plate_width, widths, heights)
}

fn parse_int(field: Option<&str>, what: &str) -> Result<i64> {
    let field = field
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| PackError::Validation(format!("missing {what}")))?;
    field
        .parse()
        .map_err(|_| PackError::Validation(format!("{what} is not an integer: '{field}'")).into())
}

pub fn write_solution<W: Write>(result: &PlacementResult, out: &mut W) -> Result<()> {
    writeln!(out, "{} {}", result.plate_width, result.height)?;
    writeln!(out, "{}", result.circuits.len())?;
    for circuit in &result.circuits {
        write!(
            out,
            "{} {} {} {}",
            circuit.width, circuit.height, circuit.x, circuit.y
        )?;
        if circuit.rotated {
            write!(out, " rotated")?;
        }
        writeln!(out)?;
    }
    writeln!(out, "----------")?;
    write!(out, "{:.4}", result.elapsed.as_secs_f64())?;
    Ok(())
}

pub fn format_solution(result: &PlacementResult) -> String {
    let mut buffer = Vec::new();
    // Writing into a Vec cannot fail.
    write_solution(result, &mut buffer).expect("in-memory write");
    String::from_utf8(buffer).expect("solution text is ascii")
}
