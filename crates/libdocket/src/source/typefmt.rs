//! One-line rendering of rustdoc JSON types, bounds and generics.

use rustdoc_types::{
    AssocItemConstraint, AssocItemConstraintKind, FunctionSignature, GenericArg, GenericArgs,
    GenericBound, GenericParamDef, GenericParamDefKind, Generics, Path, PolyTrait, Term,
    TraitBoundModifier, Type, WherePredicate,
};

/// Render a type as it would be written in source.
pub fn ty(ty: &Type) -> String {
    render(ty, false)
}

/// Render a path with its generic arguments.
pub fn path(path: &Path) -> String {
    let args = path
        .args
        .as_ref()
        .map(|args| generic_args(args))
        .unwrap_or_default();
    format!("{}{args}", path.path.replace("$crate::", ""))
}

/// `<'a, T: Clone>`, or nothing when there are no visible parameters.
pub fn generics(generics: &Generics) -> String {
    let params: Vec<String> = generics.params.iter().filter_map(param).collect();
    if params.is_empty() {
        String::new()
    } else {
        format!("<{}>", params.join(", "))
    }
}

/// ` where T: Debug`, or nothing.
pub fn where_clause(generics: &Generics) -> String {
    let predicates: Vec<String> = generics
        .where_predicates
        .iter()
        .filter_map(predicate)
        .collect();
    if predicates.is_empty() {
        String::new()
    } else {
        format!(" where {}", predicates.join(", "))
    }
}

/// Bounds joined with `+`.
pub fn bounds(bounds: &[GenericBound]) -> String {
    bounds.iter().map(bound).collect::<Vec<_>>().join(" + ")
}

/// Function parameters without the surrounding parentheses, with `self` receivers shortened.
pub fn inputs(sig: &FunctionSignature) -> String {
    sig.inputs
        .iter()
        .map(|(name, input)| {
            if name != "self" {
                return format!("{name}: {}", ty(input));
            }
            match input {
                Type::BorrowedRef {
                    lifetime,
                    is_mutable,
                    type_,
                } if is_self(type_) => {
                    let lifetime = lifetime
                        .as_ref()
                        .map(|lifetime| format!("{lifetime} "))
                        .unwrap_or_default();
                    let mutability = if *is_mutable { "mut " } else { "" };
                    format!("&{lifetime}{mutability}self")
                }
                input if is_self(input) => "self".to_string(),
                input => format!("self: {}", ty(input)),
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// ` -> T`, or nothing for unit returns.
pub fn output(sig: &FunctionSignature) -> String {
    sig.output
        .as_ref()
        .map(|output| format!(" -> {}", ty(output)))
        .unwrap_or_default()
}

fn is_self(ty: &Type) -> bool {
    match ty {
        Type::Generic(name) => name == "Self",
        Type::ResolvedPath(path) => path.path == "Self" && path.args.is_none(),
        _ => false,
    }
}

fn render(ty: &Type, nested: bool) -> String {
    match ty {
        Type::ResolvedPath(resolved) => path(resolved),
        Type::Generic(name) | Type::Primitive(name) => name.clone(),
        Type::DynTrait(dyn_trait) => {
            let mut parts: Vec<String> = dyn_trait.traits.iter().map(poly_trait).collect();
            parts.extend(dyn_trait.lifetime.clone());
            let rendered = format!("dyn {}", parts.join(" + "));
            if nested && parts.len() > 1 {
                format!("({rendered})")
            } else {
                rendered
            }
        }
        Type::FunctionPointer(pointer) => {
            format!("fn({}){}", inputs(&pointer.sig), output(&pointer.sig))
        }
        Type::Tuple(types) => {
            let inner: Vec<String> = types.iter().map(|ty| render(ty, true)).collect();
            if inner.len() == 1 {
                format!("({},)", inner[0])
            } else {
                format!("({})", inner.join(", "))
            }
        }
        Type::Slice(inner) => format!("[{}]", render(inner, true)),
        Type::Array { type_, len } => format!("[{}; {len}]", render(type_, true)),
        Type::ImplTrait(impl_bounds) => format!("impl {}", bounds(impl_bounds)),
        Type::Infer => "_".to_string(),
        Type::RawPointer { is_mutable, type_ } => {
            let mutability = if *is_mutable { "mut" } else { "const" };
            format!("*{mutability} {}", render(type_, true))
        }
        Type::BorrowedRef {
            lifetime,
            is_mutable,
            type_,
        } => {
            let lifetime = lifetime
                .as_ref()
                .map(|lifetime| format!("{lifetime} "))
                .unwrap_or_default();
            let mutability = if *is_mutable { "mut " } else { "" };
            format!("&{lifetime}{mutability}{}", render(type_, true))
        }
        Type::QualifiedPath {
            name,
            args,
            self_type,
            trait_,
        } => {
            let args = args
                .as_ref()
                .map(|args| generic_args(args))
                .unwrap_or_default();
            let self_type = render(self_type, true);
            match trait_.as_ref().map(path) {
                Some(trait_path) if !trait_path.is_empty() => {
                    format!("<{self_type} as {trait_path}>::{name}{args}")
                }
                _ => format!("{self_type}::{name}{args}"),
            }
        }
        Type::Pat { type_, .. } => render(type_, nested),
    }
}

fn generic_args(args: &GenericArgs) -> String {
    match args {
        GenericArgs::AngleBracketed { args, constraints } => {
            let rendered: Vec<String> = args
                .iter()
                .map(generic_arg)
                .chain(constraints.iter().map(constraint))
                .collect();
            if rendered.is_empty() {
                String::new()
            } else {
                format!("<{}>", rendered.join(", "))
            }
        }
        GenericArgs::Parenthesized { inputs, output } => {
            let inputs: Vec<String> = inputs.iter().map(ty).collect();
            let output = output
                .as_ref()
                .map(|output| format!(" -> {}", ty(output)))
                .unwrap_or_default();
            format!("({}){output}", inputs.join(", "))
        }
        GenericArgs::ReturnTypeNotation => "(..)".to_string(),
    }
}

fn generic_arg(arg: &GenericArg) -> String {
    match arg {
        GenericArg::Lifetime(lifetime) => lifetime.clone(),
        GenericArg::Type(arg) => ty(arg),
        GenericArg::Const(constant) => constant.expr.clone(),
        GenericArg::Infer => "_".to_string(),
    }
}

fn constraint(constraint: &AssocItemConstraint) -> String {
    match &constraint.binding {
        AssocItemConstraintKind::Equality(value) => format!("{} = {}", constraint.name, term(value)),
        AssocItemConstraintKind::Constraint(constraint_bounds) => {
            format!("{}: {}", constraint.name, bounds(constraint_bounds))
        }
    }
}

fn term(term: &Term) -> String {
    match term {
        Term::Type(value) => ty(value),
        Term::Constant(constant) => constant.expr.clone(),
    }
}

fn bound(bound: &GenericBound) -> String {
    match bound {
        GenericBound::TraitBound {
            trait_,
            generic_params,
            modifier,
        } => {
            let rendered = poly_trait(&PolyTrait {
                trait_: trait_.clone(),
                generic_params: generic_params.clone(),
            });
            match modifier {
                TraitBoundModifier::None => rendered,
                TraitBoundModifier::Maybe => format!("?{rendered}"),
                TraitBoundModifier::MaybeConst => format!("~const {rendered}"),
            }
        }
        GenericBound::Outlives(lifetime) => lifetime.clone(),
        GenericBound::Use(_) => "use<..>".to_string(),
    }
}

fn poly_trait(poly: &PolyTrait) -> String {
    let params: Vec<String> = poly.generic_params.iter().filter_map(param).collect();
    let binder = if params.is_empty() {
        String::new()
    } else {
        format!("for<{}> ", params.join(", "))
    };
    format!("{binder}{}", path(&poly.trait_))
}

fn param(param: &GenericParamDef) -> Option<String> {
    match &param.kind {
        GenericParamDefKind::Lifetime { outlives } if outlives.is_empty() => {
            Some(param.name.clone())
        }
        GenericParamDefKind::Lifetime { outlives } => {
            Some(format!("{}: {}", param.name, outlives.join(" + ")))
        }
        // `impl Trait` arguments show up as synthetic parameters.
        GenericParamDefKind::Type { is_synthetic, .. } if *is_synthetic => None,
        GenericParamDefKind::Type {
            bounds: param_bounds,
            default,
            ..
        } => {
            let mut rendered = param.name.clone();
            if !param_bounds.is_empty() {
                rendered.push_str(": ");
                rendered.push_str(&bounds(param_bounds));
            }
            if let Some(default) = default {
                rendered.push_str(" = ");
                rendered.push_str(&ty(default));
            }
            Some(rendered)
        }
        GenericParamDefKind::Const { type_, default } => {
            let default = default
                .as_ref()
                .map(|default| format!(" = {default}"))
                .unwrap_or_default();
            Some(format!("const {}: {}{default}", param.name, ty(type_)))
        }
    }
}

fn predicate(predicate: &WherePredicate) -> Option<String> {
    match predicate {
        WherePredicate::BoundPredicate {
            type_,
            bounds: predicate_bounds,
            generic_params,
        } => {
            let params: Vec<String> = generic_params.iter().filter_map(param).collect();
            let binder = if params.is_empty() {
                String::new()
            } else {
                format!("for<{}> ", params.join(", "))
            };
            Some(format!("{binder}{}: {}", ty(type_), bounds(predicate_bounds)))
        }
        WherePredicate::LifetimePredicate { lifetime, outlives } if outlives.is_empty() => {
            Some(lifetime.clone())
        }
        WherePredicate::LifetimePredicate { lifetime, outlives } => {
            Some(format!("{lifetime}: {}", outlives.join(" + ")))
        }
        WherePredicate::EqPredicate { lhs, rhs } => Some(format!("{} = {}", ty(lhs), term(rhs))),
    }
}
