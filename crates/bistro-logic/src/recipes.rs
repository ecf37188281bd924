//! Menu items, ingredients, the pantry and recipe discovery.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StorageFull;

/// Something a customer can order and a cook can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Recipe {
    Burger,
    Pizza,
    Soda,
}

impl Recipe {
    pub const ALL: [Recipe; 3] = [Recipe::Burger, Recipe::Pizza, Recipe::Soda];

    /// Ingredients consumed to cook one serving.
    pub fn ingredients(self) -> &'static [(Ingredient, u32)] {
        match self {
            Recipe::Burger => &[(Ingredient::Meat, 1), (Ingredient::Bread, 1)],
            Recipe::Pizza => &[(Ingredient::Dough, 1), (Ingredient::Cheese, 1)],
            Recipe::Soda => &[(Ingredient::Sugar, 1)],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Recipe::Burger => "burger",
            Recipe::Pizza => "pizza",
            Recipe::Soda => "soda",
        }
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The kind of appliance a cook must reserve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplianceKind {
    Stove,
    DrinkMachine,
}

/// Anything that can be produced at an appliance.
pub trait Cookable {
    /// Which appliance produces it.
    fn appliance(&self) -> ApplianceKind;
    /// Seconds of work at cooking speed 1.0.
    fn base_cook_time(&self) -> f32;
}

impl Cookable for Recipe {
    fn appliance(&self) -> ApplianceKind {
        match self {
            Recipe::Soda => ApplianceKind::DrinkMachine,
            Recipe::Burger | Recipe::Pizza => ApplianceKind::Stove,
        }
    }

    fn base_cook_time(&self) -> f32 {
        match self {
            Recipe::Soda => 0.5,
            Recipe::Burger | Recipe::Pizza => 2.0,
        }
    }
}

/// Raw ingredients, grown in gardens from seeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Ingredient {
    Meat,
    Bread,
    Cheese,
    Dough,
    Sugar,
}

impl Ingredient {
    pub const ALL: [Ingredient; 5] = [
        Ingredient::Meat,
        Ingredient::Bread,
        Ingredient::Cheese,
        Ingredient::Dough,
        Ingredient::Sugar,
    ];
}

/// Ingredient and seed stock. Only ingredients count against the limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pantry {
    ingredients: BTreeMap<Ingredient, u32>,
    seeds: BTreeMap<Ingredient, u32>,
    storage_limit: u32,
}

impl Pantry {
    pub fn new(storage_limit: u32) -> Self {
        Self {
            ingredients: BTreeMap::new(),
            seeds: BTreeMap::new(),
            storage_limit,
        }
    }

    /// Pantry with `count` of every ingredient, ignoring the limit.
    pub fn stocked(storage_limit: u32, count: u32) -> Self {
        let mut pantry = Self::new(storage_limit);
        for ingredient in Ingredient::ALL {
            pantry.ingredients.insert(ingredient, count);
        }
        pantry
    }

    pub fn count(&self, ingredient: Ingredient) -> u32 {
        self.ingredients.get(&ingredient).copied().unwrap_or(0)
    }

    pub fn seeds(&self, ingredient: Ingredient) -> u32 {
        self.seeds.get(&ingredient).copied().unwrap_or(0)
    }

    /// Total ingredients held.
    pub fn total(&self) -> u32 {
        self.ingredients.values().sum()
    }

    pub fn storage_limit(&self) -> u32 {
        self.storage_limit
    }

    pub fn set_storage_limit(&mut self, limit: u32) {
        self.storage_limit = limit;
    }

    pub fn can_cook(&self, recipe: Recipe) -> bool {
        recipe
            .ingredients()
            .iter()
            .all(|&(ingredient, n)| self.count(ingredient) >= n)
    }

    /// Take one serving's ingredients; all or nothing.
    pub fn consume(&mut self, recipe: Recipe) -> bool {
        if !self.can_cook(recipe) {
            return false;
        }
        for &(ingredient, n) in recipe.ingredients() {
            if let Some(count) = self.ingredients.get_mut(&ingredient) {
                *count -= n;
            }
        }
        true
    }

    /// Store a harvest if it fits under the limit.
    pub fn store(&mut self, ingredient: Ingredient, amount: u32) -> Result<(), StorageFull> {
        let stored = self.total();
        if stored + amount > self.storage_limit {
            return Err(StorageFull {
                stored,
                incoming: amount,
                limit: self.storage_limit,
            });
        }
        *self.ingredients.entry(ingredient).or_insert(0) += amount;
        Ok(())
    }

    pub fn add_seed(&mut self, ingredient: Ingredient) {
        *self.seeds.entry(ingredient).or_insert(0) += 1;
    }

    /// Use up one seed; false if none are held.
    pub fn take_seed(&mut self, ingredient: Ingredient) -> bool {
        match self.seeds.get_mut(&ingredient) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn ingredients(&self) -> impl Iterator<Item = (Ingredient, u32)> + '_ {
        self.ingredients.iter().map(|(k, v)| (*k, *v))
    }
}

/// Recipes customers may order and cooks may produce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeBook {
    unlocked: Vec<Recipe>,
}

impl Default for RecipeBook {
    fn default() -> Self {
        Self {
            unlocked: vec![Recipe::Burger],
        }
    }
}

impl RecipeBook {
    pub fn with_unlocked(recipes: &[Recipe]) -> Self {
        let mut book = Self { unlocked: Vec::new() };
        for &recipe in recipes {
            book.unlock(recipe);
        }
        book
    }

    pub fn is_unlocked(&self, recipe: Recipe) -> bool {
        self.unlocked.contains(&recipe)
    }

    /// Returns true if the recipe was newly unlocked.
    pub fn unlock(&mut self, recipe: Recipe) -> bool {
        if self.is_unlocked(recipe) {
            return false;
        }
        self.unlocked.push(recipe);
        true
    }

    /// Unlock every locked recipe whose ingredients are all in stock.
    pub fn discover(&mut self, pantry: &Pantry) -> Vec<Recipe> {
        let mut found = Vec::new();
        for recipe in Recipe::ALL {
            if self.is_unlocked(recipe) {
                continue;
            }
            let has_all = recipe
                .ingredients()
                .iter()
                .all(|&(ingredient, _)| pantry.count(ingredient) >= 1);
            if has_all {
                self.unlocked.push(recipe);
                found.push(recipe);
            }
        }
        found
    }

    /// Unlocked recipes in unlock order.
    pub fn unlocked(&self) -> &[Recipe] {
        &self.unlocked
    }
}
