//! Statements.

use jolt_stack::ensure_sufficient_stack;

use crate::ast::{Block, Expr, Stmt};
use crate::translator::Translator;
use crate::Result;

impl Translator<'_, '_> {
    /// Emit a block's statements in order.
    ///
    /// Statements after one that terminated the current block (a `return`,
    /// or an `if` whose arms both return) are unreachable and skipped.
    pub(crate) fn emit_block(&mut self, block: &Block) -> Result<()> {
        for (index, stmt) in block.stmts.iter().enumerate() {
            if self.builder.current_block_terminated() {
                tracing::warn!(
                    procedure = %self.procedure_name(),
                    skipped = block.stmts.len() - index,
                    "unreachable statements after terminator"
                );
                break;
            }
            self.emit_stmt(stmt)?;
        }
        Ok(())
    }

    pub(crate) fn emit_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        ensure_sufficient_stack(|| match stmt {
            Stmt::LocalDecl {
                local,
                name,
                ty,
                init,
            } => {
                let ir_ty = self.ir_type(ty)?;
                let slot = self.entry_alloca(ir_ty, name)?;
                self.bind_local(*local, slot)?;
                if let Some(init) = init {
                    let value = self.emit_value(init)?;
                    let value = self.coerce(value, ir_ty)?;
                    self.builder.store(value, slot)?;
                }
                Ok(())
            }
            Stmt::Return(value) => self.emit_return(value.as_ref()),
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => self.emit_if(cond, then_branch, else_branch.as_deref()),
            Stmt::While { cond, body } => self.emit_while(cond, body),
            Stmt::Expr(expr) => self.emit_expr(expr).map(|_| ()),
            Stmt::Block(block) => self.emit_block(block),
        })
    }

    fn emit_return(&mut self, value: Option<&Expr>) -> Result<()> {
        let Some(value) = value else {
            self.builder.ret_void()?;
            return Ok(());
        };
        let function = self.current("return")?.function;
        let ret_ty = self.module().function(function).return_type;
        let value = self.emit_value(value)?;
        let value = self.coerce(value, ret_ty)?;
        self.builder.ret(value)?;
        Ok(())
    }

    fn emit_if(&mut self, cond: &Expr, then_branch: &Stmt, else_branch: Option<&Stmt>) -> Result<()> {
        let function = self.current("if")?.function;
        let then_block = self.builder.append_block(function, "if.then");
        let else_block = else_branch.map(|_| self.builder.append_block(function, "if.else"));
        let end = self.builder.append_block(function, "if.end");

        self.emit_condition(cond, then_block, else_block.unwrap_or(end))?;

        self.builder.position_at_end(function, then_block);
        self.emit_stmt(then_branch)?;
        self.builder.br_unless_terminated(end)?;

        if let (Some(block), Some(stmt)) = (else_block, else_branch) {
            self.builder.position_at_end(function, block);
            self.emit_stmt(stmt)?;
            self.builder.br_unless_terminated(end)?;
        }

        self.builder.position_at_end(function, end);
        Ok(())
    }

    fn emit_while(&mut self, cond: &Expr, body: &Stmt) -> Result<()> {
        let function = self.current("while")?.function;
        let cond_block = self.builder.append_block(function, "while.cond");
        let body_block = self.builder.append_block(function, "while.body");
        let end = self.builder.append_block(function, "while.end");

        self.builder.br(cond_block)?;
        self.builder.position_at_end(function, cond_block);
        self.emit_condition(cond, body_block, end)?;

        self.builder.position_at_end(function, body_block);
        self.emit_stmt(body)?;
        self.builder.br_unless_terminated(cond_block)?;

        self.builder.position_at_end(function, end);
        Ok(())
    }
}
