//! Boilerplate for brand-new files.
//!
//! Templates only lay down the skeleton of a file. Fields, imports and
//! registrations are added afterwards by the mutators, so a fresh file and
//! an updated one go through the same code paths.

use crate::model::ComponentKind;

/// A navigator flavour and the package providing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigatorKind {
    Stack,
    Tab,
    Drawer,
}

impl NavigatorKind {
    pub const ALL: [NavigatorKind; 3] = [Self::Stack, Self::Tab, Self::Drawer];

    pub fn label(self) -> &'static str {
        match self {
            Self::Stack => "stack",
            Self::Tab => "tab",
            Self::Drawer => "drawer",
        }
    }

    /// Local binding created by the factory: `Stack` in `<Stack.Navigator>`.
    pub fn binding(self) -> &'static str {
        match self {
            Self::Stack => "Stack",
            Self::Tab => "Tab",
            Self::Drawer => "Drawer",
        }
    }

    pub fn factory(self) -> &'static str {
        match self {
            Self::Stack => "createStackNavigator",
            Self::Tab => "createBottomTabNavigator",
            Self::Drawer => "createDrawerNavigator",
        }
    }

    pub fn package(self) -> &'static str {
        match self {
            Self::Stack => "@react-navigation/stack",
            Self::Tab => "@react-navigation/bottom-tabs",
            Self::Drawer => "@react-navigation/drawer",
        }
    }

    /// `Stack.Navigator`
    pub fn navigator_tag(self) -> String {
        format!("{}.Navigator", self.binding())
    }

    /// `Stack.Screen`
    pub fn screen_tag(self) -> String {
        format!("{}.Screen", self.binding())
    }

    pub fn parse(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.label().eq_ignore_ascii_case(text.trim()))
    }
}

/// View `index.tsx` for the given component kind. Props and state are
/// attached afterwards.
pub fn generate_view(kind: ComponentKind, name: &str) -> String {
    match kind {
        ComponentKind::Class => generate_class_view(name),
        ComponentKind::Function => generate_function_view(name),
        ComponentKind::ArrowFunction => generate_arrow_view(name),
    }
}

fn generate_class_view(name: &str) -> String {
    format!(
        r#"import React, {{ Component }} from 'react';
import {{ Text, View }} from 'react-native';

export default class {name} extends Component {{
  render() {{
    return (
      <View>
        <Text>{name}</Text>
      </View>
    );
  }}
}}
"#
    )
}

fn generate_function_view(name: &str) -> String {
    format!(
        r#"import React from 'react';
import {{ Text, View }} from 'react-native';

export default function {name}() {{
  return (
    <View>
      <Text>{name}</Text>
    </View>
  );
}}
"#
    )
}

fn generate_arrow_view(name: &str) -> String {
    format!(
        r#"import React from 'react';
import {{ Text, View }} from 'react-native';

export const {name} = () => {{
  return (
    <View>
      <Text>{name}</Text>
    </View>
  );
}};

export default {name};
"#
    )
}

/// Reducer `index.ts` with an empty initial state and a dispatch block
/// holding only the default clause.
pub fn generate_reducer(reducer: &str, state_type: &str, actions_type: &str) -> String {
    format!(
        r#"import {{ {actions_type} }} from './actions';
import {{ {state_type} }} from './state';

const initialState: {state_type} = {{}};

export default function {reducer}(state = initialState, action: {actions_type}): {state_type} {{
  switch (action.type) {{
    default:
      return state;
  }}
}}
"#
    )
}

/// Root reducer combining every feature reducer.
pub fn generate_root_reducer() -> String {
    r#"import { combineReducers } from 'redux';

const rootReducer = combineReducers({});

export type RootState = ReturnType<typeof rootReducer>;

export default rootReducer;
"#
    .to_string()
}

/// Thunk action creator. `dispatch_type` is `Dispatch` or `Dispatch<T>`.
pub fn generate_thunk(name: &str, dispatch_type: &str) -> String {
    format!(
        r#"export const {name} = () => async (dispatch: {dispatch_type}, getState: () => RootState) => {{
  const state = getState();
  return state;
}};
"#
    )
}

/// Navigator module with an empty param list and no screens.
pub fn generate_navigator(kind: NavigatorKind, name: &str, param_list: &str) -> String {
    let binding = kind.binding();
    format!(
        r#"import React from 'react';

export type {param_list} = {{}};

const {binding} = {factory}<{param_list}>();

export default function {name}() {{
  return (
    <{binding}.Navigator>
    </{binding}.Navigator>
  );
}}
"#,
        factory = kind.factory(),
    )
}

/// Theme values. Colors are merged in later.
pub fn generate_theme() -> String {
    r#"export const colors = {
  primary: '#6200ee',
  background: '#ffffff',
  text: '#000000',
};

export const spacing = {
  small: 4,
  medium: 8,
  large: 16,
};

export const theme = {
  colors,
  spacing,
};

export type Theme = typeof theme;
"#
    .to_string()
}

/// Context provider exposing the theme to the component tree.
pub fn generate_theme_provider() -> String {
    r#"import React, { createContext, ReactNode, useContext } from 'react';

import { theme, Theme } from '.';

const ThemeContext = createContext<Theme>(theme);

export function ThemeProvider({ children, value = theme }: { children: ReactNode; value?: Theme }) {
  return <ThemeContext.Provider value={value}>{children}</ThemeContext.Provider>;
}

export const useTheme = () => useContext(ThemeContext);
"#
    .to_string()
}
