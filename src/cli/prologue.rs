//! Header written at the top of every generated file.
//!
//! The prologue names the source, imports the runtime library and binds `workspace_` so `load` can fill the module
//! namespace the way MATLAB fills the caller's workspace.

use mlpy_core::lang::runtime::{self, RuntimeFnId};

use crate::version::MLPY_VERSION;

/// Render the prologue for one output file
pub fn render(encoding: &str, runtime_module: &str, source_name: &str) -> String {
    let package = runtime_module.split('.').next().unwrap_or(runtime_module);
    let workspace = runtime::as_str(RuntimeFnId::Workspace);
    format!(
        "# -*- encoding: {encoding} -*-\n\
         # Generated with mlpy {MLPY_VERSION}\n\
         try:\n    from {runtime_module} import *\n\
         except ImportError:\n    \
         raise ImportError('File compiled with `mlpy`, please install `{package}` to run it.') from None\n\
         # {source_name}\n\
         \n\
         # simulate matlab workspace\n\
         {workspace} = locals()\n\
         \n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prologue_layout() {
        let text = render("utf-8", "smop.libsmop", "solver.m");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "# -*- encoding: utf-8 -*-");
        assert_eq!(lines[1], format!("# Generated with mlpy {MLPY_VERSION}"));
        assert_eq!(lines[2], "try:");
        assert_eq!(lines[3], "    from smop.libsmop import *");
        assert_eq!(lines[4], "except ImportError:");
        assert!(lines[5].starts_with("    raise ImportError("));
        assert!(lines[5].contains("`smop`"));
        assert_eq!(lines[6], "# solver.m");
        assert_eq!(lines[7], "");
        assert_eq!(lines[9], "workspace_ = locals()");
        assert!(text.ends_with("locals()\n\n"));
    }
}
