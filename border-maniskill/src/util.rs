//! Utility functions for array conversion.
#[cfg(feature = "candle")]
pub mod candle;

pub mod ndarray {
    use ndarray::{Array, Dimension};
    use num_traits::cast::AsPrimitive;

    /// Casts the elements of an array, preserving its shape.
    pub fn cast_array<T1, T2, D>(arr: &Array<T1, D>) -> Array<T2, D>
    where
        T1: AsPrimitive<T2>,
        T2: 'static + Copy,
        D: Dimension,
    {
        arr.mapv(|elem| elem.as_())
    }

    #[cfg(feature = "h5py")]
    pub(crate) use py::pyobj_to_arrayd;

    #[cfg(feature = "h5py")]
    mod py {
        use anyhow::Result;
        use ndarray::ArrayD;
        use num_traits::cast::AsPrimitive;
        use numpy::{Element, PyArrayDyn};
        use pyo3::PyAny;

        /// Converts a numpy array into [`ArrayD`], casting its elements.
        pub(crate) fn pyobj_to_arrayd<T1, T2>(obj: &PyAny) -> Result<ArrayD<T2>>
        where
            T1: Element + AsPrimitive<T2>,
            T2: 'static + Copy,
        {
            let arr: &PyArrayDyn<T1> = obj.extract()?;
            let arr = arr.to_owned_array();
            Ok(super::cast_array(&arr))
        }
    }
}
