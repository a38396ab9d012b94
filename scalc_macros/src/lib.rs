use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, FnArg, GenericArgument, ItemFn, PatType, PathArguments, Type};

#[derive(Clone, Copy)]
enum Scalar {
    Decimal,
    Float,
    Integer,
}

enum ArgKind {
    Required(Scalar),
    Optional(Scalar),
    Rest,
}

fn scalar_of(ty: &Type) -> Option<Scalar> {
    if let Type::Path(type_path) = ty {
        let ident = &type_path.path.segments.last()?.ident;
        return match ident.to_string().as_str() {
            "BigDecimal" => Some(Scalar::Decimal),
            "f64" => Some(Scalar::Float),
            "i64" => Some(Scalar::Integer),
            _ => None,
        };
    }
    None
}

fn classify(ty: &Type) -> Option<ArgKind> {
    match ty {
        Type::Reference(reference) => match *reference.elem {
            Type::Slice(ref slice) if matches!(scalar_of(&slice.elem), Some(Scalar::Decimal)) => {
                Some(ArgKind::Rest)
            }
            _ => None,
        },
        Type::Path(type_path) => {
            let segment = type_path.path.segments.last()?;
            if segment.ident == "Option" {
                if let PathArguments::AngleBracketed(ref generics) = segment.arguments {
                    if let Some(GenericArgument::Type(inner)) = generics.args.first() {
                        return scalar_of(inner).map(ArgKind::Optional);
                    }
                }
                return None;
            }
            scalar_of(ty).map(ArgKind::Required)
        }
        _ => None,
    }
}

fn convert(scalar: Scalar, value: proc_macro2::TokenStream) -> proc_macro2::TokenStream {
    match scalar {
        Scalar::Decimal => quote! { (#value).clone() },
        Scalar::Float => quote! { ::scalc_rs::decimal::to_f64(#value)? },
        Scalar::Integer => quote! { ::scalc_rs::decimal::to_i64(#value)? },
    }
}

/// Turns a function with typed parameters into a builtin-compatible
/// `fn(&CalculationOptions, &[BigDecimal]) -> Result<BigDecimal, CalcError>`.
///
/// The first parameter receives the options unchanged. Every other parameter is
/// taken from the argument list by position: `BigDecimal`, `f64` and `i64` are
/// required, `Option<_>` of those is optional, and a trailing `&[BigDecimal]`
/// collects the rest. The argument count is checked before the body runs.
#[proc_macro_attribute]
pub fn scalc_fn(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    let attrs = &input.attrs;
    let vis = &input.vis;
    let fn_name = &input.sig.ident;
    let fn_output = &input.sig.output;
    let fn_body = &input.block;
    let display_name = fn_name.to_string();

    let mut inputs = input.sig.inputs.iter();
    let options_arg = match inputs.next() {
        Some(FnArg::Typed(arg)) => arg,
        _ => {
            return syn::Error::new_spanned(
                &input.sig,
                "expected the calculation options as first parameter",
            )
            .to_compile_error()
            .into()
        }
    };

    let args_ident = format_ident!("__scalc_args");
    let mut extractions = Vec::new();
    let mut required = 0usize;
    let mut optional = 0usize;
    let mut has_rest = false;

    for (i, arg) in inputs.enumerate() {
        let FnArg::Typed(PatType { pat, ty, .. }) = arg else {
            return syn::Error::new_spanned(arg, "unsupported receiver")
                .to_compile_error()
                .into();
        };
        if has_rest {
            return syn::Error::new_spanned(arg, "the rest parameter has to be the last one")
                .to_compile_error()
                .into();
        }

        let extract = match classify(ty) {
            Some(ArgKind::Required(scalar)) => {
                if optional > 0 {
                    return syn::Error::new_spanned(
                        arg,
                        "required parameters cannot follow optional ones",
                    )
                    .to_compile_error()
                    .into();
                }
                required += 1;
                let value = convert(scalar, quote! { &#args_ident[#i] });
                quote! { let #pat: #ty = #value; }
            }
            Some(ArgKind::Optional(scalar)) => {
                optional += 1;
                let value = convert(scalar, quote! { value });
                quote! {
                    let #pat: #ty = match #args_ident.get(#i) {
                        Some(value) => Some(#value),
                        None => None,
                    };
                }
            }
            Some(ArgKind::Rest) => {
                if optional > 0 {
                    return syn::Error::new_spanned(
                        arg,
                        "a rest parameter cannot follow optional ones",
                    )
                    .to_compile_error()
                    .into();
                }
                has_rest = true;
                quote! { let #pat: #ty = &#args_ident[#i..]; }
            }
            None => {
                return syn::Error::new_spanned(
                    ty,
                    "expected BigDecimal, f64, i64, Option<_> of those, or &[BigDecimal]",
                )
                .to_compile_error()
                .into();
            }
        };
        extractions.push(extract);
    }

    let maximum = required + optional;
    let (expected, arity_check) = if has_rest && required == 0 {
        ("any number of".to_string(), quote! { false })
    } else if has_rest {
        (
            format!("at least {}", required),
            quote! { #args_ident.len() < #required },
        )
    } else if optional == 0 {
        (
            format!("{}", required),
            quote! { #args_ident.len() != #required },
        )
    } else {
        (
            format!("{} to {}", required, maximum),
            quote! { #args_ident.len() < #required || #args_ident.len() > #maximum },
        )
    };

    let expanded = quote! {
        #(#attrs)*
        #vis fn #fn_name(#options_arg, #args_ident: &[::scalc_rs::BigDecimal]) #fn_output {
            if #arity_check {
                return Err(::scalc_rs::CalcError::arity(#display_name, #expected, #args_ident.len()));
            }

            #(#extractions)*

            #fn_body
        }
    };

    TokenStream::from(expanded)
}
