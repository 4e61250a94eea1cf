/***************************************/
/*               Macros                */
/***************************************/
/// Unwrap a startup-critical result, or log the failure and exit. Only for
/// main-thread initialisation, where there is nothing to fall back to; the
/// worker threads recover or break out of their loops instead.
#[macro_export]
macro_rules! unwrap_or_exit {
    ($expr:expr, $context:expr) => {
        match $expr {
            Ok(val) => val,
            Err(e) => {
                ::log::error!("{} failed: {}", $context, e);
                ::std::process::exit(1);
            }
        }
    };
}
