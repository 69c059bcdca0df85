/// Asserts that two `f64` expressions differ by less than `prec`. An optional trailing format
/// string and arguments are appended to the panic message, which helps when asserting inside a
/// loop over trace samples.
#[macro_export]
macro_rules! assert_almost_eq {
    ($left:expr, $right:expr, $prec:expr $(,)?) => {
        $crate::assert_almost_eq!($left, $right, $prec, "")
    };
    ($left:expr, $right:expr, $prec:expr, $($msg:tt)+) => {{
        let (left, right, prec): (f64, f64, f64) = ($left, $right, $prec);
        if !$crate::numeric::almost_eq(left, right, prec) {
            panic!(
                "assertion failed: `abs(left - right) < {:e}`, (left: `{}`, right: `{}`) {}",
                prec,
                left,
                right,
                format_args!($($msg)+)
            );
        }
    }};
}
