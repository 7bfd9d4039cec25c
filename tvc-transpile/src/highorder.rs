//! Higher-order array method expansion (§4.4): `map`/`filter`/`reduce`/
//! `find`/`findIndex`/`some`/`every`/`forEach`/`flatMap` have no single-
//! expression TL equivalent, so each expands into a temp-var preamble plus
//! the platform's native `for each` loop.

/// Chain-depth limit above which nested higher-order calls become a fatal
/// `UNSUPPORTED_HANDLER_BODY` ("chain too deep").
pub const MAX_CHAIN_DEPTH: u32 = 4;

pub fn is_higher_order_method(name: &str) -> bool {
    matches!(
        name,
        "map" | "filter" | "reduce" | "find" | "findIndex" | "some" | "every" | "forEach" | "flatMap"
    )
}

pub struct Expansion {
    pub preamble: Vec<String>,
    pub code: String,
}

/// Expands every higher-order method except `reduce`, whose accumulator
/// substitution the caller performs on `body_code` before calling
/// [`expand_reduce`].
pub fn expand(method: &str, temp_var: &str, item_var: &str, array_code: &str, body_code: &str) -> Expansion {
    let mut lines = Vec::new();
    match method {
        "map" => {
            lines.push(format!("{} = []", temp_var));
            lines.push(format!("for each {} in {}", item_var, array_code));
            lines.push(format!("    {}.Push({})", temp_var, body_code));
            lines.push("end for".to_string());
            Expansion { preamble: lines, code: temp_var.to_string() }
        }
        "filter" => {
            lines.push(format!("{} = []", temp_var));
            lines.push(format!("for each {} in {}", item_var, array_code));
            lines.push(format!("    if {} then", body_code));
            lines.push(format!("        {}.Push({})", temp_var, item_var));
            lines.push("    end if".to_string());
            lines.push("end for".to_string());
            Expansion { preamble: lines, code: temp_var.to_string() }
        }
        "forEach" => {
            lines.push(format!("for each {} in {}", item_var, array_code));
            lines.push(format!("    {}", body_code));
            lines.push("end for".to_string());
            Expansion { preamble: lines, code: "invalid".to_string() }
        }
        "some" => {
            lines.push(format!("{} = false", temp_var));
            lines.push(format!("for each {} in {}", item_var, array_code));
            lines.push(format!("    if {} then", body_code));
            lines.push(format!("        {} = true", temp_var));
            lines.push("    end if".to_string());
            lines.push("end for".to_string());
            Expansion { preamble: lines, code: temp_var.to_string() }
        }
        "every" => {
            lines.push(format!("{} = true", temp_var));
            lines.push(format!("for each {} in {}", item_var, array_code));
            lines.push(format!("    if not ({}) then", body_code));
            lines.push(format!("        {} = false", temp_var));
            lines.push("    end if".to_string());
            lines.push("end for".to_string());
            Expansion { preamble: lines, code: temp_var.to_string() }
        }
        "find" => {
            lines.push(format!("{} = invalid", temp_var));
            lines.push(format!("for each {} in {}", item_var, array_code));
            lines.push(format!("    if {} and {} = invalid then", body_code, temp_var));
            lines.push(format!("        {} = {}", temp_var, item_var));
            lines.push("    end if".to_string());
            lines.push("end for".to_string());
            Expansion { preamble: lines, code: temp_var.to_string() }
        }
        "findIndex" => {
            let idx_var = format!("{}_i", temp_var);
            lines.push(format!("{} = -1", temp_var));
            lines.push(format!("{} = 0", idx_var));
            lines.push(format!("for each {} in {}", item_var, array_code));
            lines.push(format!("    if {} and {} = -1 then", body_code, temp_var));
            lines.push(format!("        {} = {}", temp_var, idx_var));
            lines.push("    end if".to_string());
            lines.push(format!("    {} = {} + 1", idx_var, idx_var));
            lines.push("end for".to_string());
            Expansion { preamble: lines, code: temp_var.to_string() }
        }
        "flatMap" => {
            lines.push(format!("{} = []", temp_var));
            lines.push(format!("for each {} in {}", item_var, array_code));
            lines.push(format!("    {}.Append({})", temp_var, body_code));
            lines.push("end for".to_string());
            Expansion { preamble: lines, code: temp_var.to_string() }
        }
        other => unreachable!("{} is not a higher-order method", other),
    }
}

/// `reduce`: the accumulator parameter was already textually substituted
/// by `temp_var` inside `body_code` (§4.4).
pub fn expand_reduce(temp_var: &str, item_var: &str, array_code: &str, body_code: &str, initial_code: &str) -> Expansion {
    let lines = vec![
        format!("{} = {}", temp_var, initial_code),
        format!("for each {} in {}", item_var, array_code),
        format!("    {} = {}", temp_var, body_code),
        "end for".to_string(),
    ];
    Expansion { preamble: lines, code: temp_var.to_string() }
}
