//! Structural comparison of dynamic values.

use std::fmt;

use crate::value::DynValue;

/// One place where two values disagree.
///
/// `got` or `want` is `None` when the path only exists on the other side.
#[derive(Debug, Clone, PartialEq)]
pub struct Difference {
    /// Location of the mismatch, `$` being the root
    pub path: String,
    /// Value found on the obtained side
    pub got: Option<DynValue>,
    /// Value found on the expected side
    pub want: Option<DynValue>,
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.path)?;
        match &self.got {
            Some(got) => writeln!(f, "\t-got:  {got}")?,
            None => writeln!(f, "\t-got:  <missing>")?,
        }
        match &self.want {
            Some(want) => write!(f, "\t+want: {want}"),
            None => write!(f, "\t+want: <missing>"),
        }
    }
}

/// Compares two values and returns every difference, outermost first.
#[must_use]
pub fn diff(got: &DynValue, want: &DynValue) -> Vec<Difference> {
    let mut differences = Vec::new();
    walk("$".to_string(), got, want, &mut differences);
    differences
}

/// Renders differences in `-got +want` form, one block per path.
#[must_use]
pub fn render_diff(differences: &[Difference]) -> String {
    differences
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

fn walk(path: String, got: &DynValue, want: &DynValue, out: &mut Vec<Difference>) {
    match (got, want) {
        (DynValue::Map(got_entries), DynValue::Map(want_entries)) => {
            for (key, got_value) in got_entries {
                let child = child_key(&path, key);
                match want_entries.get(key) {
                    Some(want_value) => walk(child, got_value, want_value, out),
                    None => out.push(Difference {
                        path: child,
                        got: Some(got_value.clone()),
                        want: None,
                    }),
                }
            }
            for (key, want_value) in want_entries {
                if !got_entries.contains_key(key) {
                    out.push(Difference {
                        path: child_key(&path, key),
                        got: None,
                        want: Some(want_value.clone()),
                    });
                }
            }
        }
        (DynValue::Seq(got_items), DynValue::Seq(want_items)) => {
            let longest = got_items.len().max(want_items.len());
            for index in 0..longest {
                let child = format!("{path}[{index}]");
                match (got_items.get(index), want_items.get(index)) {
                    (Some(g), Some(w)) => walk(child, g, w, out),
                    (g, w) => out.push(Difference {
                        path: child,
                        got: g.cloned(),
                        want: w.cloned(),
                    }),
                }
            }
        }
        _ if got == want => {}
        _ => out.push(Difference {
            path,
            got: Some(got.clone()),
            want: Some(want.clone()),
        }),
    }
}

fn child_key(path: &str, key: &str) -> String {
    let plain = !key.is_empty() && key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-');
    if plain {
        format!("{path}.{key}")
    } else {
        format!("{path}[{key:?}]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn value(v: serde_json::Value) -> DynValue {
        DynValue::from(v)
    }

    #[test]
    fn test_equal_values_have_no_diff() {
        let a = value(json!({"First": 47.11, "Last": [{"First": "Hello"}]}));
        assert!(diff(&a, &a.clone()).is_empty());
    }

    #[test]
    fn test_scalar_mismatch_names_path() {
        let got = value(json!({"Last": [{"First": "Hello"}]}));
        let want = value(json!({"Last": [{"First": "World"}]}));

        let differences = diff(&got, &want);
        assert_eq!(
            differences,
            vec![Difference {
                path: "$.Last[0].First".to_string(),
                got: Some(DynValue::String("Hello".to_string())),
                want: Some(DynValue::String("World".to_string())),
            }]
        );
    }

    #[test]
    fn test_extra_and_missing_keys() {
        let got = value(json!({"NotThere": 47.11}));
        let want = value(json!({"First": 47.11}));

        let paths: Vec<_> = diff(&got, &want).into_iter().map(|d| d.path).collect();
        assert_eq!(paths, vec!["$.NotThere", "$.First"]);
    }

    #[test]
    fn test_sequence_length_mismatch() {
        let got = value(json!([1, 2, 3]));
        let want = value(json!([1, 2]));

        let differences = diff(&got, &want);
        assert_eq!(differences.len(), 1);
        assert_eq!(differences[0].path, "$[2]");
        assert_eq!(differences[0].want, None);
    }

    #[test]
    fn test_type_mismatch_is_single_difference() {
        let got = value(json!({"a": "1"}));
        let want = value(json!({"a": 1}));
        assert_eq!(diff(&got, &want).len(), 1);
    }

    #[test]
    fn test_render_diff() {
        let got = value(json!({"key with space": true}));
        let want = value(json!({"key with space": false}));
        assert_eq!(
            render_diff(&diff(&got, &want)),
            "$[\"key with space\"]:\n\t-got:  true\n\t+want: false"
        );
    }
}
