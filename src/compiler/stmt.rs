use crate::{
    ast::{
        ast::{Stmt, VarDeclarator},
        types::Type,
    },
    errors::errors::Error,
};

use super::{
    compiler::Compiler,
    expr::gen_expression,
    stdlib::{default_value, variable_name},
};

pub fn gen_block(compiler: &mut Compiler, statements: &[Stmt]) -> Result<(), Error> {
    for statement in statements {
        gen_statement(compiler, statement)?;
    }
    Ok(())
}

fn gen_nested_block(compiler: &mut Compiler, statements: &[Stmt]) -> Result<(), Error> {
    compiler.indent();
    gen_block(compiler, statements)?;
    compiler.dedent();
    Ok(())
}

pub fn gen_statement(compiler: &mut Compiler, statement: &Stmt) -> Result<(), Error> {
    match statement {
        Stmt::VarDecl { ty, declarators, line } => {
            let type_code = compiler.type_code(ty, *line)?;
            for declarator in declarators {
                gen_declarator(compiler, ty, &type_code, declarator)?;
            }
        }
        Stmt::Assign { target, value, .. } => {
            let mut prelude = vec![];
            let target_code = gen_expression(compiler, target, &mut prelude)?;
            let value_code = gen_expression(compiler, value, &mut prelude)?;

            compiler.emit_all(prelude);
            compiler.emit(format!("{} = {};", target_code, value_code));
        }
        Stmt::If {
            condition,
            then_body,
            else_body,
            ..
        } => {
            let mut prelude = vec![];
            let condition_code = gen_expression(compiler, condition, &mut prelude)?;

            compiler.emit_all(prelude);
            compiler.emit(format!("if ({}) {{", condition_code));
            gen_nested_block(compiler, then_body)?;

            if let Some(else_body) = else_body {
                compiler.emit("} else {");
                gen_nested_block(compiler, else_body)?;
            }
            compiler.emit("}");
        }
        Stmt::While { condition, body, .. } => {
            let mut prelude = vec![];
            let condition_code = gen_expression(compiler, condition, &mut prelude)?;

            if prelude.is_empty() {
                compiler.emit(format!("while ({}) {{", condition_code));
                gen_nested_block(compiler, body)?;
                compiler.emit("}");
            } else {
                // The temporaries have to be rebuilt before every check
                compiler.emit("while (true) {");
                compiler.indent();
                compiler.emit_all(prelude);
                compiler.emit(format!("if (!({})) break;", condition_code));
                gen_block(compiler, body)?;
                compiler.dedent();
                compiler.emit("}");
            }
        }
        Stmt::Forall {
            variable,
            source,
            body,
            line,
        } => {
            let mut prelude = vec![];
            let source_code = gen_expression(compiler, source, &mut prelude)?;

            let source_type = compiler.type_of(source.id);
            let element_type = match &source_type {
                Type::Array(element) => (**element).clone(),
                _ => Type::Generic,
            };
            let vector_code = compiler.type_code(&source_type, *line)?;
            let element_code = compiler.type_code(&element_type, *line)?;

            let source_name = compiler.next_temp("_src");
            let iterator_name = compiler.next_temp("_it");

            compiler.emit_all(prelude);
            compiler.emit(format!("{} {} = {};", vector_code, source_name, source_code));
            compiler.emit(format!(
                "for ({vector}::iterator {it} = {src}.begin(); {it} != {src}.end(); ++{it}) {{",
                vector = vector_code,
                it = iterator_name,
                src = source_name
            ));
            compiler.indent();
            compiler.emit(format!(
                "{} {} = *{};",
                element_code,
                variable_name(variable),
                iterator_name
            ));
            gen_block(compiler, body)?;
            compiler.dedent();
            compiler.emit("}");
        }
        Stmt::Return { value, .. } => {
            if compiler.in_rule {
                compiler.emit("return 0;");
                return Ok(());
            }

            match value {
                Some(value) => {
                    let mut prelude = vec![];
                    let value_code = gen_expression(compiler, value, &mut prelude)?;
                    compiler.emit_all(prelude);
                    compiler.emit(format!("return {};", value_code));
                }
                None => compiler.emit("return;"),
            }
        }
        Stmt::Score { value, .. } => {
            let mut prelude = vec![];
            let value_code = gen_expression(compiler, value, &mut prelude)?;
            compiler.emit_all(prelude);
            compiler.emit(format!("return {};", value_code));
        }
        Stmt::Call { call, .. } => {
            let mut prelude = vec![];
            let call_code = gen_expression(compiler, call, &mut prelude)?;
            compiler.emit_all(prelude);
            compiler.emit(format!("{};", call_code));
        }
    }

    Ok(())
}

fn gen_declarator(
    compiler: &mut Compiler,
    ty: &Type,
    type_code: &str,
    declarator: &VarDeclarator,
) -> Result<(), Error> {
    let name = variable_name(&declarator.name);
    match &declarator.value {
        Some(value) => {
            let mut prelude = vec![];
            let value_code = gen_expression(compiler, value, &mut prelude)?;
            compiler.emit_all(prelude);
            compiler.emit(format!("{} {} = {};", type_code, name, value_code));
        }
        None => match default_value(ty) {
            Some(default) => compiler.emit(format!("{} {} = {};", type_code, name, default)),
            None => compiler.emit(format!("{} {};", type_code, name)),
        },
    }

    Ok(())
}
