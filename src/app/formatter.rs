use crate::app::models::LoadResult;
use crate::app::tree::{Node, Tree};
use anyhow::Result;
use serde::Serialize;

pub struct OutputGenerator;

impl OutputGenerator {
    pub fn generate_tree<T>(tree: &Tree<T>) -> String {
        let mut output = String::new();
        Self::write_level(tree, 0, &mut output);
        output.trim_end().to_string()
    }

    fn write_level<T>(tree: &Tree<T>, depth: usize, output: &mut String) {
        let indent = "    ".repeat(depth);
        for (name, node) in tree.iter() {
            match node {
                Node::Branch(children) => {
                    output.push_str(&format!("{}{}/\n", indent, name));
                    Self::write_level(children, depth + 1, output);
                }
                Node::Leaf(_) => output.push_str(&format!("{}{}\n", indent, name)),
            }
        }
    }

    pub fn generate_namespaces(namespaces: &[String]) -> String {
        namespaces.join("\n")
    }

    pub fn generate_json<T: Serialize>(result: &LoadResult<T>) -> Result<String> {
        Ok(serde_json::to_string_pretty(result)?)
    }

    pub fn format_full_output<T>(result: &LoadResult<T>) -> String {
        let mut out = String::from("<tree>\n");
        out.push_str(&Self::generate_tree(&result.tree));
        out.push_str("\n</tree>\n\n<namespaces>\n");
        out.push_str(&Self::generate_namespaces(&result.namespaces));
        out.push_str("\n</namespaces>");

        if !result.failures.is_empty() {
            out.push_str("\n\n<failures>\n");
            for failure in &result.failures {
                out.push_str(&format!("{}: {}\n", failure.namespace, failure.message));
            }
            out.push_str("</failures>");
        }

        out
    }
}
