use crate::{scope::Assertion, value::Value, Assertions};
use std::{borrow::Borrow, cmp::PartialEq, fmt::Debug};

/// Assertions for types implementing [`IntoIterator`] trait.
///
/// ### Examples
/// ```
/// use fluent_assertions::*;
/// use std::collections::HashMap;
///
/// // test subject containing item that meet condition
/// vec![1, 2, 3].should().contain_item_that(|v| *v > 1);
///
/// // use for_times() clause to test how many items found meeting condition
/// vec![1, 2, 3].should().contain_item_that(|v| *v > 1).for_times(2);
///
/// // test subject not containing any item that meet condition
/// vec![1, 2, 3].should().not_contain_item_that(|v| *v > 4);
///
/// // test subject to contain only one item
/// vec![3].should().be_single();
///
/// // then use with_value() clause to verify the value.
/// // this will only work if value type implementing PartialEq.
/// vec![3].should().be_single().with_value(3);
///
/// // or use which_value() clause to start a new test statement for the value
/// vec![3].should().be_single().which_value().should().be_less_than(4);
///
/// // if Iterator::Item is reference, which_value() returns reference as well
/// vec![3].iter().should().be_single().which_value().should().be(&3);
///
/// // test subject to have specified length
/// vec![1, 2, 3].should().have_length(3);
///
/// // Note: hashmaps are iterators so they can also use IterAssertions.
/// // for hashmap Iterator::Item = (K, V)
/// let mut subject = HashMap::new();
/// subject.insert(12, "abc");
/// subject.should().be_single().which_value().0.should().be(12);
///
/// // test subject to be empty
/// "".chars().should().be_empty();
/// ```
pub trait IterAssertions<T, I>
where I: IntoIterator<Item = T>
{
    fn contain_item_that<F: Fn(&T) -> bool>(self, pred: F) -> IterConstraint<T, CountExtension>;
    fn not_contain_item_that<F: Fn(&T) -> bool>(self, pred: F) -> IterConstraint<T, ()>;

    fn be_single(self) -> IterConstraint<T, SingleExtension>;
    fn have_length(self, expected: usize) -> IterConstraint<T, ()>;
    fn be_empty(self) -> IterConstraint<T, ()>;
}

/// Additional assertions for type implementing [`IntoIterator`], when
/// [`IntoIterator::Item`] implementing [`PartialEq`].
///
/// ### Examples
/// ```
/// use fluent_assertions::{PartialEqIterAssertions, *};
///
/// // test subject containing a specific value
/// vec![1, 2, 3].should().contain(2);
///
/// // same as contain_item_that(), can use for_times() clause to test number of occurence
/// vec![1, 2, 2, 3].should().contain(2).for_times(2);
///
/// // test subject containing all the specified items
/// // NOTE: duplicate items are not deduped. If a target item appears multiple times,
/// // it's supposed to appear in subject for that many times.
/// vec![1, 2, 2, 3, 3, 3].should().contain_all_of(vec![2, 2, 3]);
///
/// // test subject not to contain a specific item
/// vec![1, 2, 3].should().not_contain(4);
///
/// // test subject equal a target iterator
/// vec![1, 2, 3].should().equal_iterator(vec![1, 2, 3]);
/// ```
pub trait PartialEqIterAssertions<T, I>
where I: IntoIterator<Item = T>
{
    fn contain<E: Borrow<T>>(self, expected_value: E) -> IterConstraint<T, CountExtension>;
    fn contain_all_of<E>(self, expected_values_iter: E) -> IterConstraint<T, ()>
    where
        E: IntoIterator,
        <E as IntoIterator>::Item: Borrow<T>;
    fn not_contain<E: Borrow<T>>(self, expected_value: E) -> IterConstraint<T, ()>;
    fn equal_iterator<E>(self, expected_iter: E) -> IterConstraint<T, ()>
    where
        E: IntoIterator,
        <E as IntoIterator>::Item: Borrow<T>;
}

/// Result of the collection assertions.
///
/// Iterating consumes the subject, so the items are collected into a [`Vec`] which `and()`
/// hands back. A `&Vec<T>` subject continues as `Vec<&T>`.
pub struct IterConstraint<T, E> {
    items: Vec<T>,
    assertion: Assertion,
    extension: E,
}

impl<T, E> IterConstraint<T, E> {
    pub fn and(self) -> Vec<T> {
        self.items
    }

    fn with_extension<X>(self, extension: X) -> IterConstraint<T, X> {
        IterConstraint {
            items: self.items,
            assertion: self.assertion,
            extension,
        }
    }
}

impl<T: Debug> IterConstraint<T, ()> {
    fn collect<I: IntoIterator<Item = T>>(assertions: Assertions<I>) -> Self {
        let assertion = assertions.assertion();
        IterConstraint {
            items: assertions.into_inner().into_iter().collect(),
            assertion,
            extension: (),
        }
    }

    fn fail_unless(&self, condition: bool, template: &str, args: impl FnOnce(&[T]) -> Vec<Value>) {
        self.assertion.clone().for_condition(condition).fail_with_args(template, || args(&self.items));
    }
}

pub struct CountExtension {
    description: Value,
    count: usize,
}

impl<T: Debug> IterConstraint<T, CountExtension> {
    pub fn for_times(self, n: usize) -> IterConstraint<T, ()> {
        let CountExtension { description, count } = &self.extension;
        self.assertion.clone().for_condition(*count == n).fail_with_args(
            "Expected {context:collection} {0} to contain {1} {2} time(s){reason}, but found it {3} time(s).",
            || vec![Value::debug(&self.items), description.clone(), Value::debug(&n), Value::debug(count)],
        );

        self.with_extension(())
    }
}

pub struct SingleExtension;

impl<T> IterConstraint<T, SingleExtension> {
    /// The single item.
    ///
    /// Panics unless there is exactly one, which can only be observed inside an
    /// [`AssertionScope`](crate::AssertionScope).
    pub fn which_value(mut self) -> T {
        match self.items.len() {
            1 => self.items.remove(0),
            n => panic!("which_value() needs exactly one item, found {}", n),
        }
    }
}

impl<T: PartialEq + Debug> IterConstraint<T, SingleExtension> {
    pub fn with_value<E: Borrow<T>>(self, expected: E) -> IterConstraint<T, ()> {
        let expected = expected.borrow();
        if let [single] = self.items.as_slice() {
            self.assertion
                .clone()
                .for_condition(single == expected)
                .fail_with_args("Expected {context:collection} to contain only {0}{reason}, but found {1}.", || {
                    vec![Value::debug(expected), Value::debug(single)]
                });
        }

        self.with_extension(())
    }
}

impl<T, I> IterAssertions<T, I> for Assertions<I>
where
    T: Debug,
    I: IntoIterator<Item = T>,
{
    fn contain_item_that<F: Fn(&T) -> bool>(self, matching_fn: F) -> IterConstraint<T, CountExtension> {
        let ic = IterConstraint::collect(self);
        let count = ic.items.iter().filter(|v| matching_fn(v)).count();

        ic.fail_unless(
            count > 0,
            "Expected {context:collection} {0} to contain an item matching the predicate{reason}.",
            |items| vec![Value::debug(items)],
        );

        ic.with_extension(CountExtension {
            description: Value::literal("an item matching the predicate"),
            count,
        })
    }

    fn not_contain_item_that<F: Fn(&T) -> bool>(self, pred: F) -> IterConstraint<T, ()> {
        let ic = IterConstraint::collect(self);
        let position = ic.items.iter().position(|v| pred(v));

        ic.fail_unless(
            position.is_none(),
            "Expected {context:collection} {0} to not contain any item matching the predicate{reason}, but found {1}.",
            |items| vec![Value::debug(items), position.map_or(Value::literal("none"), |i| Value::debug(&items[i]))],
        );

        ic
    }

    fn be_single(self) -> IterConstraint<T, SingleExtension> {
        let ic = IterConstraint::collect(self);

        ic.fail_unless(
            ic.items.len() == 1,
            "Expected {context:collection} to contain a single item{reason}, but found {0}.",
            |items| vec![Value::debug(items)],
        );

        ic.with_extension(SingleExtension)
    }

    fn have_length(self, expected: usize) -> IterConstraint<T, ()> {
        let ic = IterConstraint::collect(self);

        ic.fail_unless(
            ic.items.len() == expected,
            "Expected {context:collection} to contain {0} item(s){reason}, but found {1}: {2}.",
            |items| vec![Value::debug(&expected), Value::debug(&items.len()), Value::debug(items)],
        );

        ic
    }

    fn be_empty(self) -> IterConstraint<T, ()> {
        let ic = IterConstraint::collect(self);

        ic.fail_unless(
            ic.items.is_empty(),
            "Expected {context:collection} to be empty{reason}, but found {0}.",
            |items| vec![Value::debug(items)],
        );

        ic
    }
}

impl<T, I> PartialEqIterAssertions<T, I> for Assertions<I>
where
    T: PartialEq + Debug,
    I: IntoIterator<Item = T>,
{
    fn contain<E: Borrow<T>>(self, expected_value: E) -> IterConstraint<T, CountExtension> {
        let ic = IterConstraint::collect(self);
        let expected = expected_value.borrow();
        let count = ic.items.iter().filter(|v| *v == expected).count();

        ic.fail_unless(count > 0, "Expected {context:collection} {0} to contain {1}{reason}.", |items| {
            vec![Value::debug(items), Value::debug(expected)]
        });

        ic.with_extension(CountExtension {
            description: Value::debug(expected),
            count,
        })
    }

    fn contain_all_of<E>(self, expected_values_iter: E) -> IterConstraint<T, ()>
    where
        E: IntoIterator,
        <E as IntoIterator>::Item: Borrow<T>,
    {
        let ic = IterConstraint::collect(self);
        let expected_values: Vec<_> = expected_values_iter.into_iter().collect();

        let mut matched = vec![false; ic.items.len()];
        let mut missing = vec![];

        for expected in expected_values.iter().map(Borrow::borrow) {
            let found = ic.items.iter().enumerate().position(|(i, actual)| !matched[i] && actual == expected);
            match found {
                Some(index) => matched[index] = true,
                None => missing.push(expected),
            }
        }

        let expected_values: Vec<&T> = expected_values.iter().map(Borrow::borrow).collect();
        ic.fail_unless(
            missing.is_empty(),
            "Expected {context:collection} {0} to contain {1}{reason}, but could not find {2}.",
            |items| vec![Value::debug(items), Value::debug(&expected_values), Value::debug(&missing)],
        );

        ic
    }

    fn not_contain<E: Borrow<T>>(self, expected_value: E) -> IterConstraint<T, ()> {
        let ic = IterConstraint::collect(self);
        let unexpected = expected_value.borrow();

        ic.fail_unless(
            !ic.items.contains(unexpected),
            "Expected {context:collection} {0} to not contain {1}{reason}.",
            |items| vec![Value::debug(items), Value::debug(unexpected)],
        );

        ic
    }

    fn equal_iterator<E>(self, expected_iter: E) -> IterConstraint<T, ()>
    where
        E: IntoIterator,
        <E as IntoIterator>::Item: Borrow<T>,
    {
        let ic = IterConstraint::collect(self);
        let expected_vec: Vec<_> = expected_iter.into_iter().collect();
        let expected: Vec<&T> = expected_vec.iter().map(Borrow::borrow).collect();

        let mismatch = ic.items.iter().zip(expected.iter()).position(|(actual, expected)| actual != *expected);

        match mismatch {
            Some(index) => ic.fail_unless(
                false,
                "Expected {context:collection} to be equal to {0}{reason}, but {1} differs at index {2}.",
                |items| vec![Value::debug(&expected), Value::debug(items), Value::debug(&index)],
            ),
            None => ic.fail_unless(
                ic.items.len() == expected.len(),
                "Expected {context:collection} to be equal to {0}{reason}, but {1} contains {2} item(s) instead of {3}.",
                |items| {
                    vec![
                        Value::debug(&expected),
                        Value::debug(items),
                        Value::debug(&items.len()),
                        Value::debug(&expected.len()),
                    ]
                },
            ),
        }

        ic
    }
}

#[cfg(test)]
mod tests {

    use crate::*;
    use std::collections::LinkedList;

    #[test]
    fn contains_should_allow_for_multiple_borrow_types_for_intoiter() {
        vec![1, 2, 3]
            .should()
            .contain(2)
            .and()
            .should()
            .contain(&2)
            .and()
            .should()
            .contain(&mut 2);
    }

    #[test]
    fn ref_vec_could_chain_with_and() {
        (&vec![1, 2, 3]).should().contain(&2).and().should().not_contain(&4);
    }

    #[test]
    fn contains_for_times() {
        vec![1, 2, 2].should().contain(2).for_times(2);
        should_fail_with_message!(
            vec![1, 2, 2].should().contain(2).for_times(3),
            "Expected collection [1, 2, 2] to contain 2 3 time(s), but found it 2 time(s)."
        );
    }

    #[test]
    fn contain_item_should_not_panic_if_condition_meets() {
        vec![1, 2, 3].should().contain_item_that(|v| *v > 1).for_times(2);
    }

    #[test]
    fn should_panic_if_vec_does_not_contain_value() {
        let test_vec = vec![1, 2, 3];
        should_fail_with_message!(
            should!(test_vec).contain(5),
            "Expected test_vec [1, 2, 3] to contain 5."
        );
    }

    #[test]
    fn should_not_panic_if_vec_does_not_contain_value_if_expected() {
        let test_vec = vec![1, 2, 3];
        test_vec.should().not_contain(4);
    }

    #[test]
    fn should_panic_if_vec_does_contain_value_and_expected_not_to() {
        let test_vec = vec![1, 2, 3];
        should_fail_with_message!(test_vec.should().not_contain(2), "Expected collection [1, 2, 3] to not contain 2.");
    }

    #[test]
    fn should_not_panic_if_iterable_contains_value() {
        let mut test_into_iter = LinkedList::new();
        test_into_iter.push_back(1);
        test_into_iter.push_back(2);
        test_into_iter.push_back(3);

        test_into_iter.should().contain(2);
    }

    #[test]
    fn should_not_panic_if_iterable_contains_all_expected_values() {
        let mut test_into_iter = LinkedList::new();
        test_into_iter.push_back(1);
        test_into_iter.push_back(2);
        test_into_iter.push_back(3);

        test_into_iter.should().contain_all_of(vec![2, 3]);
    }

    #[test]
    fn should_panic_if_iterable_does_not_contain_all_expected_values() {
        let mut test_into_iter = LinkedList::new();
        test_into_iter.push_back(1);
        test_into_iter.push_back(2);
        test_into_iter.push_back(3);

        should_fail_with_message!(test_into_iter.should().contain_all_of(vec![1, 6]), "*but could not find [6].");
    }

    #[test]
    fn should_not_panic_if_iterator_contains_all_expected_values() {
        let test_vec = vec![1, 2, 3];
        test_vec.iter().should().contain_all_of(vec![&2, &3]);
    }

    #[test]
    fn should_panic_if_iterator_does_not_contain_all_expected_values_exactly() {
        let test_vec = vec![1, 2, 3];

        should_fail_with_message!(test_vec.should().contain_all_of(&vec![1, 1, 3]), "*but could not find [1].");
    }

    #[test]
    fn should_not_panic_if_iteratable_equals_expected_iterator() {
        let expected_vec = vec![1, 2, 3];
        let test_vec = vec![1, 2, 3];

        test_vec.should().equal_iterator(expected_vec);
    }

    #[test]
    fn should_panic_if_iteratable_does_not_equal_expected_iterator() {
        let expected_vec = vec![1, 2, 4];
        let test_vec = vec![1, 2, 3];

        should_fail_with_message!(
            test_vec.should().equal_iterator(expected_vec),
            "Expected collection to be equal to [1, 2, 4], but [1, 2, 3] differs at index 2."
        );
        should_fail_with_message!(
            vec![1, 2].should().equal_iterator(&[1, 2, 3]),
            "*but [1, 2] contains 2 item(s) instead of 3."
        );
    }

    #[test]
    fn should_not_panic_if_iterator_does_not_contain_value_if_expected() {
        let test_vec = vec![1, 2, 3];
        test_vec.should().not_contain_item_that(|v| *v > 4);
        should_fail_with_message!(
            vec![1, 2, 3].should().not_contain_item_that(|v| *v > 1),
            "*to not contain any item matching the predicate, but found 2."
        );
    }

    #[test]
    fn should_not_panic_if_vec_length_matches_expected() {
        let test_vec = vec![1, 2, 3];
        test_vec.should().have_length(3);
    }

    #[test]
    fn should_panic_if_vec_length_does_not_match_expected() {
        let test_vec = vec![1, 2, 3];

        should_fail_with_message!(
            test_vec.should().have_length(1),
            "Expected collection to contain 1 item(s), but found 3: [1, 2, 3]."
        );
    }

    #[test]
    fn should_not_panic_if_vec_was_expected_to_be_empty_and_is() {
        let test_vec: Vec<u8> = vec![];
        test_vec.should().be_empty();
    }

    #[test]
    fn should_panic_if_vec_was_expected_to_be_empty_and_is_not() {
        should_fail_with_message!(vec![1].should().be_empty(), "Expected collection to be empty, but found [1].");
    }

    #[test]
    fn should_be_single_which_value() {
        vec![1].should().be_single().which_value().should().be(1);
    }

    #[test]
    fn should_be_single_with_value() {
        vec![1].should().be_single().with_value(1);
        should_fail_with_message!(vec![1].should().be_single().with_value(2), "Expected collection to contain only 2, but found 1.");
    }

    #[test]
    fn should_be_single_panic_when_not_single() {
        should_fail_with_message!(vec![1, 2].should().be_single(), "Expected collection to contain a single item, but found [1, 2].");
    }
}
