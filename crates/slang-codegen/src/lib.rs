//! AST to textual IR translation for the S-Lang compiler.
//!
//! The emitter walks the parsed [`slang_syntax::ast::TeaSpill`] and renders
//! an LLVM-flavored textual module: externs become `declare` lines,
//! definitions become `define` bodies built from stack slots, numbered
//! temporaries and labeled basic blocks.

pub mod codegen;
mod emitter;

pub use codegen::Codegen;

#[cfg(test)]
mod tests {
    use super::*;
    use slang_parser::Parser;
    use slang_syntax::error::{ErrorKind, Result};

    fn generate_str(input: &str) -> Result<String> {
        let mut parser = Parser::new(input).expect("Lexing should succeed");
        let program = parser.parse_program()?;
        Codegen::new().generate(&program)
    }

    fn generate_ok(input: &str) -> String {
        generate_str(input).expect("Codegen should succeed")
    }

    #[test]
    fn simple_main_defines_a_function() {
        let ir = generate_ok("spillingTheTeaAbout demo pluh main() : int { yeet 0 }");
        assert!(ir.contains("; ModuleID = 'demo'"));
        assert!(ir.contains("define i64 @main() {"));
        assert!(ir.contains("ret i64 0"));
    }

    #[test]
    fn extern_becomes_a_declare_line() {
        let ir = generate_ok("spillingTheTeaAbout demo plug yap(x : int) : npc");
        assert!(ir.contains("declare void @yap(i64)"));
    }

    #[test]
    fn arguments_get_stack_slots() {
        let ir = generate_ok(
            "spillingTheTeaAbout demo pluh twice(x : int) : int { yeet x + x }",
        );
        assert!(ir.contains("define i64 @twice(i64 %p0) {"));
        assert!(ir.contains("store i64 %p0, ptr %t0"));
        assert!(ir.contains("add i64"));
    }

    #[test]
    fn while_loop_lowers_to_labeled_blocks() {
        let ir = generate_ok(
            r#"spillingTheTeaAbout demo
            pluh count(n : int) : npc {
                holdUp n > 0 {
                    n = n - 1
                }
            }"#,
        );
        assert!(ir.contains("cond0:"));
        assert!(ir.contains("body0:"));
        assert!(ir.contains("endloop0:"));
        assert!(ir.contains("icmp sgt i64"));
        assert!(ir.contains("br i1"));
        assert!(ir.contains("ret void"));
    }

    #[test]
    fn break_and_continue_branch_to_loop_labels() {
        let ir = generate_ok(
            r#"spillingTheTeaAbout demo
            pluh spin(n : int) : npc {
                holdUp n > 0 {
                    fr? n == 2 { ghost }
                    ong? n == 3 { rizz }
                    justLikeThat? { n = n - 1 }
                }
            }"#,
        );
        assert!(ir.contains("br label %endloop0"));
        assert!(ir.contains("br label %cond0"));
    }

    #[test]
    fn discarded_call_statement_is_emitted() {
        let ir = generate_ok(
            r#"spillingTheTeaAbout demo
            plug yap(x : int) : npc
            pluh main() : int {
                yap(1 + 2)
                yeet 0
            }"#,
        );
        assert!(ir.contains("call void @yap(i64"));
    }

    #[test]
    fn string_literals_become_globals() {
        let ir = generate_ok(
            r#"spillingTheTeaAbout demo
            pluh main() : int {
                cookUp greeting : string = "hello"
                yeet 0
            }"#,
        );
        assert!(ir.contains("@.str.0 = private unnamed_addr constant [6 x i8] c\"hello\\00\""));
        assert!(ir.contains("store ptr @.str.0"));
    }

    #[test]
    fn float_arithmetic_uses_float_instructions() {
        let ir = generate_ok(
            r#"spillingTheTeaAbout demo
            pluh main() : float {
                cookUp x : float = 1.5
                yeet x + 2.5
            }"#,
        );
        assert!(ir.contains("fadd double"));
        assert!(ir.contains("ret double"));
    }

    #[test]
    fn break_outside_a_loop_is_rejected() {
        let err = generate_str("spillingTheTeaAbout demo pluh f() : npc { ghost }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Codegen);
    }

    #[test]
    fn undefined_function_is_rejected() {
        let err = generate_str(
            "spillingTheTeaAbout demo pluh main() : int { missing(1) yeet 0 }",
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Codegen);
    }

    #[test]
    fn undefined_variable_is_rejected() {
        let err =
            generate_str("spillingTheTeaAbout demo pluh main() : int { yeet hello }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Codegen);
    }

    #[test]
    fn duplicate_function_names_are_rejected() {
        let err = generate_str(
            "spillingTheTeaAbout demo pluh f() : int { yeet 0 } pluh f() : int { yeet 1 }",
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Codegen);
    }

    #[test]
    fn initializer_type_mismatch_is_rejected() {
        let err = generate_str(
            "spillingTheTeaAbout demo pluh main() : int { cookUp x : int = facts yeet 0 }",
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Codegen);
    }

    #[test]
    fn call_arity_mismatch_is_rejected() {
        let err = generate_str(
            r#"spillingTheTeaAbout demo
            plug yap(x : int) : npc
            pluh main() : int { yap(1, 2) yeet 0 }"#,
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Codegen);
    }

    #[test]
    fn unknown_type_name_is_rejected() {
        let err = generate_str(
            "spillingTheTeaAbout demo pluh main() : int { cookUp x : quux yeet 0 }",
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Codegen);
    }
}
