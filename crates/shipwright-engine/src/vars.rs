//! Variable substitution for pipeline commands.

use shipwright_core::Variable;
use tracing::warn;

/// Upper bound on replacements of one `${key}` token in a single command. A
/// value containing its own token would otherwise replace forever.
const SUBSTITUTION_CAP: usize = 1_000;

/// Replace `${key}` tokens in `command`, one variable at a time in table
/// order.
///
/// Each token is replaced repeatedly until no occurrence remains before the
/// next variable is considered, so tokens introduced by earlier values are
/// themselves substituted. Unknown tokens are left in place.
pub fn resolve(command: &str, vars: &[Variable]) -> String {
    let mut resolved = command.to_string();
    for var in vars {
        let token = format!("${{{}}}", var.key);
        let mut rounds = 0;
        while resolved.contains(&token) {
            if rounds >= SUBSTITUTION_CAP {
                warn!(key = %var.key, "substitution cap reached, value expands to its own token");
                break;
            }
            resolved = resolved.replacen(&token, &var.value, 1);
            rounds += 1;
        }
    }
    resolved
}

/// Merge caller-supplied overrides into `vars`: overwrite the value in place
/// when the key exists, append otherwise. First-seen key order is preserved.
pub fn merge_overrides(vars: &mut Vec<Variable>, overrides: Vec<Variable>) {
    for over in overrides {
        match vars.iter_mut().find(|v| v.key == over.key) {
            Some(existing) => existing.value = over.value,
            None => vars.push(over),
        }
    }
}
