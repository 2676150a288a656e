mod settings_test;
