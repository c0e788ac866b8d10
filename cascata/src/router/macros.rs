/// Build the per-connector closure handed to the provider chain.
///
/// The closure yields `None` for connectors without the capability so the chain
/// skips them. Listed `clone` bindings are cloned into each provider's future.
/// The generated future fetches through `$p` and runs that provider's validator.
macro_rules! provider_call {
    (
        accessor: $accessor:ident,
        validate: $validate:ident,
        capability: $capability:expr,
        clone: [$($arg:ident),* $(,)?],
        call: |$p:ident| $call:expr $(,)?
    ) => {
        move |c: std::sync::Arc<dyn cascata_core::CascataConnector>| {
            c.$accessor()?;
            $( let $arg = $arg.clone(); )*
            Some(async move {
                let $p = c.$accessor().ok_or_else(|| {
                    cascata_core::CascataError::unsupported($capability.as_str())
                })?;
                let payload = $call.await?;
                Ok::<_, cascata_core::CascataError>($p.$validate(payload))
            })
        }
    };
}

pub(crate) use provider_call;
