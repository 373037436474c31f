extern crate proc_macro;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Error, ItemFn, ReturnType, Type};

/// Returns the declared return type of the function, `()` if there is none.
fn return_type(input: &ItemFn) -> Type {
    match &input.sig.output {
        ReturnType::Type(_, t) => (**t).clone(),
        ReturnType::Default => syn::parse_quote!(()),
    }
}

/// Rejects the signatures that can't become a coroutine creator.
fn check_signature(input: &ItemFn, macro_name: &str) -> Result<(), Error> {
    if let Some(asyncness) = &input.sig.asyncness {
        return Err(Error::new_spanned(
            asyncness,
            format!("#[{macro_name}] can't be applied to an async fn"),
        ));
    }
    if let Some(constness) = &input.sig.constness {
        return Err(Error::new_spanned(
            constness,
            format!("#[{macro_name}] can't be applied to a const fn"),
        ));
    }

    Ok(())
}

/// Replaces the return type with `#wrapper<Ret>` and the body with
/// `#wrapper::<Ret>::new(#[coroutine] static move || #body)`.
fn wrap_function(input: ItemFn, wrapper: TokenStream2, macro_name: &str) -> TokenStream2 {
    if let Err(err) = check_signature(&input, macro_name) {
        return err.to_compile_error();
    }

    let ret = return_type(&input);
    let ItemFn { attrs, vis, sig, block } = input;
    let fn_name = &sig.ident;
    let fn_args = &sig.inputs;
    let fn_generics = &sig.generics;
    let fn_where_clause = &sig.generics.where_clause;
    let unsafety = &sig.unsafety;

    quote! {
        #(#attrs)*
        #vis #unsafety fn #fn_name #fn_generics (#fn_args) -> #wrapper<#ret> #fn_where_clause {
            #wrapper::<#ret>::new(#[coroutine] static move || #block)
        }
    }
}

/// A macro that converts a function into a task creator.
///
/// The function keeps its name and arguments, but calling it only creates a suspended
/// `Task` that owns the arguments. The body runs when the task is awaited or waited for.
/// Inside the body, `co_await!` awaits other tasks and offloaded work.
///
/// # What this macro does
///
/// - Changes the return type `Ret` to `Task<Ret>` (`Task<()>` for functions without one).
/// - Moves the body into a static move coroutine, so `return` and `?` work as usual.
///
/// # Limitations
///
/// The arguments are moved into the task, so they must be `Send + 'static`, as well as
/// everything the body holds across `co_await!`.
///
/// # Example
///
/// ```ignore
/// use cotask::{co_await, task};
///
/// #[task]
/// fn depth(n: u64) -> u64 {
///     if n == 0 {
///         return 0;
///     }
///     co_await!(depth(n - 1)) + 1
/// }
/// ```
#[proc_macro_attribute]
pub fn task(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    TokenStream::from(wrap_function(input, quote!(::cotask::Task), "task"))
}

/// A macro that converts a function into a generator creator.
///
/// The declared return type is the type of the yielded values. The body yields them
/// with `yield` and finishes the sequence by returning.
///
/// # Example
///
/// ```ignore
/// use cotask::generator;
///
/// #[generator]
/// fn squares(limit: u32) -> u32 {
///     for i in 0..limit {
///         yield i * i;
///     }
/// }
///
/// assert_eq!(squares(4).collect::<Vec<_>>(), vec![0, 1, 4, 9]);
/// ```
#[proc_macro_attribute]
pub fn generator(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    if let Err(err) = check_signature(&input, "generator") {
        return TokenStream::from(err.to_compile_error());
    }

    let item_type = return_type(&input);
    let ItemFn { attrs, vis, sig, block } = input;
    let fn_name = &sig.ident;
    let fn_args = &sig.inputs;
    let fn_generics = &sig.generics;
    let fn_where_clause = &sig.generics.where_clause;

    let expanded = quote! {
        #(#attrs)*
        #vis fn #fn_name #fn_generics (#fn_args) -> ::cotask::Generator<#item_type> #fn_where_clause {
            ::cotask::Generator::<#item_type>::new(#[coroutine] static move || {
                #block;
            })
        }
    };

    TokenStream::from(expanded)
}

/// Turns a function into a `#[test]` that runs its body as a task and blocks until it completes.
///
/// `co_await!` can be used inside the test body. A panic of the task fails the test.
/// The test may return a value that implements `Termination`, for example, a `Result`.
///
/// # Example
///
/// ```ignore
/// use cotask::{co_await, offload, test_task};
///
/// #[test_task]
/// fn offloaded_sum() {
///     let sum = co_await!(offload(|| 2 + 2));
///     assert_eq!(sum, 4);
/// }
/// ```
#[proc_macro_attribute]
pub fn test_task(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    if let Err(err) = check_signature(&input, "test_task") {
        return TokenStream::from(err.to_compile_error());
    }
    if !input.sig.inputs.is_empty() {
        let err = Error::new_spanned(&input.sig.inputs, "#[test_task] functions can't take arguments");
        return TokenStream::from(err.to_compile_error());
    }

    let ret = return_type(&input);
    let ItemFn { attrs, vis, sig, block } = input;
    let fn_name = &sig.ident;
    let fn_output = &sig.output;

    let expanded = quote! {
        #[test]
        #(#attrs)*
        #vis fn #fn_name() #fn_output {
            ::cotask::blocking_wait(::cotask::Task::<#ret>::new(#[coroutine] static move || #block))
        }
    };

    TokenStream::from(expanded)
}
