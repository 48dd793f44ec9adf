//! Boolean expressions lowered to branches.
//!
//! `a && b` only evaluates `b` when `a` holds, and `a || b` only when it
//! does not, so both become chains of conditional branches instead of
//! values. Negation swaps the targets.

use jolt_llvm::{BlockId, CmpPredicate, TypeId, ValueId};
use jolt_stack::ensure_sufficient_stack;

use crate::ast::{BinaryOp, Expr, ExprKind, Literal, UnaryOp};
use crate::translator::Translator;
use crate::Result;

impl Translator<'_, '_> {
    /// Branch to `if_true` when `expr` holds and to `if_false` otherwise.
    /// Terminates the current block.
    pub(crate) fn emit_condition(&mut self, expr: &Expr, if_true: BlockId, if_false: BlockId) -> Result<()> {
        ensure_sufficient_stack(|| match &expr.kind {
            ExprKind::Literal(Literal::Bool(value)) => {
                self.builder.br(if *value { if_true } else { if_false })?;
                Ok(())
            }
            ExprKind::Unary {
                op: UnaryOp::Not,
                operand,
            } => self.emit_condition(operand, if_false, if_true),
            ExprKind::Binary {
                op: op @ (BinaryOp::And | BinaryOp::Or),
                lhs,
                rhs,
            } => {
                let function = self.current("condition")?.function;
                let is_and = *op == BinaryOp::And;
                let rhs_block = self
                    .builder
                    .append_block(function, if is_and { "and.rhs" } else { "or.rhs" });
                let (on_lhs_true, on_lhs_false) = if is_and {
                    (rhs_block, if_false)
                } else {
                    (if_true, rhs_block)
                };
                self.emit_condition(lhs, on_lhs_true, on_lhs_false)?;
                self.builder.position_at_end(function, rhs_block);
                self.emit_condition(rhs, if_true, if_false)
            }
            _ => {
                let value = self.emit_value(expr)?;
                let i1 = self.builder.module_mut().types.i1();
                let value = self.coerce_condition(value, i1)?;
                self.builder.cond_br(value, if_true, if_false)?;
                Ok(())
            }
        })
    }

    /// `value` as an `i1`; wider integers compare against zero.
    fn coerce_condition(&mut self, value: ValueId, i1: TypeId) -> Result<ValueId> {
        let ty = self.module().value_type(value);
        if ty == i1 {
            return Ok(value);
        }
        let zero = self.builder.module_mut().const_zero(ty)?;
        Ok(self.builder.cmp(CmpPredicate::Ne, value, zero, "tobool")?)
    }

    /// Materialize a boolean expression as an `i1` through a stack slot.
    ///
    /// Used for `&&` and `||` in value position.
    pub(crate) fn emit_boolean_value(&mut self, expr: &Expr) -> Result<ValueId> {
        let function = self.current("boolean expression")?.function;
        let i1 = self.builder.module_mut().types.i1();
        let temp = self.entry_alloca(i1, "bool.temp")?;
        let if_true = self.builder.append_block(function, "bool.true");
        let if_false = self.builder.append_block(function, "bool.false");
        let end = self.builder.append_block(function, "bool.end");

        self.emit_condition(expr, if_true, if_false)?;
        for (block, value) in [(if_true, true), (if_false, false)] {
            self.builder.position_at_end(function, block);
            let value = self.builder.module_mut().const_bool(value);
            self.builder.store(value, temp)?;
            self.builder.br(end)?;
        }

        self.builder.position_at_end(function, end);
        Ok(self.builder.load(temp, "bool.value")?)
    }
}
