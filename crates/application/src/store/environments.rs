//! Environment mutations and the environment editing buffer.

use courier_domain::{
    DomainError, DomainResult, EntityKind, Environment, Variable, is_duplicate_name,
    is_duplicate_name_except, parse_variable_value, renumber_environments,
};

use super::{LocalStore, Outcome, check_index};
use crate::ports::Notification;

impl LocalStore {
    /// Replaces the active environments.
    pub fn replace_environments(&mut self, mut environments: Vec<Environment>) {
        renumber_environments(&mut environments);
        *self.active_environments_mut() = environments;
    }

    /// Appends imported environments and confirms with `confirmation`.
    ///
    /// The whole batch is rejected if any name collides with an existing
    /// environment.
    pub fn import_environments(&mut self, imported: Vec<Environment>, confirmation: &str) -> Outcome {
        let collision = imported
            .iter()
            .find(|environment| is_duplicate_name(self.active_environments(), &environment.name))
            .map(|environment| duplicate(&environment.name));
        if let Some(error) = collision {
            return self.settle(Err(error));
        }
        let environments = self.active_environments_mut();
        environments.extend(imported);
        renumber_environments(environments);
        self.notify(Notification::info(confirmation).with_icon("folder_shared"));
        Outcome::Applied
    }

    /// Appends an environment.
    pub fn add_environment(&mut self, environment: Environment) -> Outcome {
        if is_duplicate_name(self.active_environments(), &environment.name) {
            return self.settle(Err(duplicate(&environment.name)));
        }
        let environments = self.active_environments_mut();
        environments.push(environment);
        renumber_environments(environments);
        Outcome::Applied
    }

    /// Removes the environment at `index`.
    pub fn remove_environment(&mut self, index: usize) -> Outcome {
        let environments = self.active_environments_mut();
        let result = check_index("environment", index, environments.len()).map(|()| {
            environments.remove(index);
            renumber_environments(environments);
        });
        self.settle(result)
    }

    /// Overwrites the environment at `index`.
    ///
    /// With a single environment the name is not checked.
    pub fn save_environment(&mut self, index: usize, environment: Environment) -> Outcome {
        let result = self.try_save_environment(index, environment);
        self.settle(result)
    }

    fn try_save_environment(&mut self, index: usize, mut environment: Environment) -> DomainResult<()> {
        let environments = self.active_environments_mut();
        check_index("environment", index, environments.len())?;
        if environments.len() > 1 && is_duplicate_name_except(environments, &environment.name, index) {
            return Err(duplicate(&environment.name));
        }
        environment.environment_index = Some(index);
        environments[index] = environment;
        Ok(())
    }

    /// Loads an environment into the editing buffer.
    pub fn set_editing_environment(&mut self, environment: Environment) {
        self.selection.editing_environment = environment;
    }

    /// Appends a variable to the editing buffer.
    pub fn add_variable(&mut self, variable: Variable) {
        self.selection.editing_environment.variables.push(variable);
    }

    /// Replaces every variable of the editing buffer.
    pub fn replace_variables(&mut self, variables: Vec<Variable>) {
        self.selection.editing_environment.variables = variables;
    }

    /// Renames the variable at `index` of the editing buffer.
    pub fn set_variable_key(&mut self, index: usize, key: &str) -> Outcome {
        let result = self.variable_mut(index).map(|variable| {
            variable.key = key.to_string();
        });
        self.settle(result)
    }

    /// Sets the value of the variable at `index` from user input.
    ///
    /// Input that parses as JSON (`123`, `true`, `{"a":1}`) is stored as
    /// that value; anything else is stored as a string.
    pub fn set_variable_value(&mut self, index: usize, raw: &str) -> Outcome {
        let result = self.variable_mut(index).map(|variable| {
            variable.value = parse_variable_value(raw);
        });
        self.settle(result)
    }

    /// Removes the variable at `index` of the editing buffer.
    pub fn remove_variable(&mut self, index: usize) -> Outcome {
        let variables = &mut self.selection.editing_environment.variables;
        let result = check_index("variable", index, variables.len()).map(|()| {
            variables.remove(index);
        });
        self.settle(result)
    }

    fn variable_mut(&mut self, index: usize) -> DomainResult<&mut Variable> {
        let variables = &mut self.selection.editing_environment.variables;
        let len = variables.len();
        variables
            .get_mut(index)
            .ok_or(DomainError::index("variable", index, len))
    }
}

fn duplicate(name: &str) -> DomainError {
    DomainError::DuplicateName {
        kind: EntityKind::Environment,
        name: name.to_string(),
    }
}
