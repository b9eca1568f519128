/// Builds a [`Matrix`](crate::matrix::Matrix) from row literals, rows separated by `;`.
///
/// ```
/// use matrix::matrix;
///
/// let m = matrix![
///     1.0, 2.0;
///     3.0, 4.0
/// ];
/// assert_eq!(m.shape(), (2, 2));
/// ```
#[macro_export]
macro_rules! matrix {
    ( $( $($val:expr),+ );* $(;)? ) => {
        $crate::matrix::Matrix::from_rows(&[ $( ::std::vec![$($val),+] ),* ])
    };
}
