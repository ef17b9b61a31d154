//! Utilitários de comparação de nomes
//!
//! Os nomes de status e campos do Neaktor costumam estar em cirílico
//! ("новый заказ", "Пароль"), então a comparação case-insensitive precisa
//! usar o case folding Unicode completo e não apenas ASCII.

/// Compara duas strings ignorando maiúsculas/minúsculas (Unicode)
///
/// # Exemplos
///
/// ```
/// use neaktor::matching::equal_fold;
///
/// assert!(equal_fold("Новый Заказ", "новый заказ"));
/// assert!(equal_fold("EMAIL", "email"));
/// assert!(!equal_fold("email", "e-mail"));
/// ```
pub fn equal_fold(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Retorna o primeiro item cujo nome bate com `title` (via [`equal_fold`])
///
/// A ordem de iteração define qual item vence quando há nomes duplicados.
pub fn find_by_name<'a, T, I, F>(items: I, title: &str, name_of: F) -> Option<&'a T>
where
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> &str,
    T: 'a,
{
    items
        .into_iter()
        .find(|item| equal_fold(name_of(item), title))
}
