//! Turning a raw native result back into a literal node.

use hdl_ir::{AstArena, Literal, NodeId};

use crate::engine::GenericValue;

/// Build the literal for `value` as the result of `call`, typed like the
/// call.
///
/// Enumerations decode as an unsigned ordinal and become a reference to
/// the literal declaration; integer and physical results decode as signed
/// 64-bit; reals as a double. `None` when the value does not fit the type
/// (including infinite or NaN reals) or the type has no literal form.
pub fn materialize(arena: &mut AstArena, call: NodeId, value: GenericValue) -> Option<NodeId> {
    let ty_id = arena.node_type(call);
    let ty = arena.ty(ty_id);
    if ty.is_enum() {
        let ordinal = u64::try_from(value.to_int(false)).ok()?;
        let literal = arena.enum_literal(ty_id, ordinal)?;
        Some(arena.alloc_ref(literal))
    } else if ty.is_integer_like() {
        let int = i64::try_from(value.to_int(true)).ok()?;
        Some(arena.alloc_literal(Literal::Int(int), ty_id))
    } else if ty.is_real() {
        let real = value.to_f64();
        real.is_finite()
            .then(|| arena.alloc_literal(Literal::real(real), ty_id))
    } else {
        None
    }
}
