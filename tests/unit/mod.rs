mod transformers;
