//! Attribute parsing for the Record derive macro.
//!
//! Field attributes: `#[record(field)]`, `#[record(skip)]`,
//! `#[record(nested)]`, `#[record(rename = "...")]`.
//! Container attribute: `#[record(methods(name, ...))]`.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Ident, Lit, Meta, Result, Token,
};

/// Field-level attributes from `#[record(...)]`.
#[derive(Debug, Clone)]
pub struct FieldAttr {
    /// Expose the field even though it is not `pub`.
    pub expose: bool,
    /// Never expose the field.
    pub skip: bool,
    /// The field holds a nested record reachable through dotted paths.
    pub nested: bool,
    /// Custom name for lookups (default: field name).
    pub rename: Option<String>,
    /// The span for error reporting.
    pub span: Span,
}

impl Default for FieldAttr {
    fn default() -> Self {
        FieldAttr {
            expose: false,
            skip: false,
            nested: false,
            rename: None,
            span: Span::call_site(),
        }
    }
}

impl FieldAttr {
    fn merge(&mut self, other: FieldAttr) {
        self.expose |= other.expose;
        self.skip |= other.skip;
        self.nested |= other.nested;
        if other.rename.is_some() {
            self.rename = other.rename;
        }
        self.span = other.span;
    }
}

impl Parse for FieldAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = FieldAttr {
            span: input.span(),
            ..FieldAttr::default()
        };

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) if p.is_ident("field") => attr.expose = true,
                Meta::Path(p) if p.is_ident("skip") => attr.skip = true,
                Meta::Path(p) if p.is_ident("nested") => attr.nested = true,

                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    if let syn::Expr::Lit(syn::ExprLit {
                        lit: Lit::Str(s), ..
                    }) = &nv.value
                    {
                        if s.value().is_empty() {
                            return Err(Error::new(s.span(), "rename must not be empty"));
                        }
                        attr.rename = Some(s.value());
                    } else {
                        return Err(Error::new(
                            nv.value.span(),
                            "rename must be a string literal",
                        ));
                    }
                }

                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown record attribute. Expected: field, skip, nested, or rename = \"...\"",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

/// Extract and merge every `#[record(...)]` attribute on a field.
pub fn parse_field_attrs(attrs: &[Attribute]) -> Result<FieldAttr> {
    let mut merged = FieldAttr::default();
    for attr in attrs {
        if attr.path().is_ident("record") {
            merged.merge(attr.parse_args::<FieldAttr>()?);
        }
    }
    if merged.skip && (merged.expose || merged.nested || merged.rename.is_some()) {
        return Err(Error::new(
            merged.span,
            "skip cannot be combined with field, nested or rename",
        ));
    }
    Ok(merged)
}

/// Container-level attributes from `#[record(...)]` on the struct.
#[derive(Debug, Clone, Default)]
pub struct ContainerAttr {
    /// Zero-argument methods exposed as members, in declaration order.
    pub methods: Vec<Ident>,
}

impl Parse for ContainerAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = ContainerAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::List(list) if list.path.is_ident("methods") => {
                    let names =
                        list.parse_args_with(Punctuated::<Ident, Token![,]>::parse_terminated)?;
                    attr.methods.extend(names);
                }
                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown record attribute. Expected: methods(...)",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

/// Extract and merge every `#[record(...)]` attribute on the struct.
pub fn parse_container_attrs(attrs: &[Attribute]) -> Result<ContainerAttr> {
    let mut merged = ContainerAttr::default();
    for attr in attrs {
        if attr.path().is_ident("record") {
            merged.methods.extend(attr.parse_args::<ContainerAttr>()?.methods);
        }
    }
    Ok(merged)
}
