//! Integration tests covering trait indexing.
mod utils;
use utils::*;

gen_tests! {
    traits, {
        rt {
            required_and_provided_items: {
                input: r#"
                    pub trait Shape: Clone {
                        const SIDES: u32;
                        type Output;
                        fn area(&self) -> f64;
                        fn name(&self) -> String {
                            String::from("shape")
                        }
                    }
                "#,
                output: r#"
                    pub trait Shape: Clone
                        const SIDES: u32
                        type Output
                        fn area(&self) -> f64
                        fn name(&self) -> String
                "#
            }
        }
        rt {
            generic_trait: {
                input: r#"
                    pub trait Convert<T> {
                        fn convert(&self) -> T;
                    }
                "#,
                output: r#"
                    pub trait Convert<T>
                        fn convert(&self) -> T
                "#
            }
        }
        rt {
            unsafe_trait: {
                input: r#"
                    pub unsafe trait Zeroable {}
                "#,
                output: r#"
                    pub unsafe trait Zeroable
                "#
            }
        }
        rt {
            private_trait_hidden: {
                input: r#"
                    trait Sealed {
                        fn seal(&self);
                    }
                    pub trait Open {}
                "#,
                output: r#"
                    pub trait Open
                "#
            }
        }
        rt_private {
            private_trait_items_inherit_visibility: {
                input: r#"
                    trait Sealed {
                        fn seal(&self);
                    }
                "#,
                output: r#"
                    trait Sealed
                        fn seal(&self)
                "#
            }
        }
    }
}
